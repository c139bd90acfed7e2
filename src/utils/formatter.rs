use crate::http::ResponseRecord;
use crate::settings::{StyleTokens, Theme, hex_to_rgb};
use colored::*;

pub enum ResponseFormat {
    Compact,
    Verbose,
}

pub struct ResponseFormatter {
    format: ResponseFormat,
    tokens: StyleTokens,
    color: bool,
    show_body: bool,
    show_headers: bool,
    show_timing: bool,
}

impl ResponseFormatter {
    pub fn new(format: ResponseFormat) -> Self {
        Self {
            format,
            tokens: Theme::default().tokens(),
            color: true,
            show_body: true,
            show_headers: true,
            show_timing: true,
        }
    }

    /// 使用当前主题的颜色
    pub fn with_tokens(mut self, tokens: StyleTokens) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn format(&self, response: &ResponseRecord) -> String {
        match self.format {
            ResponseFormat::Compact => self.format_compact(response),
            ResponseFormat::Verbose => self.format_verbose(response),
        }
    }

    fn status_line(&self, response: &ResponseRecord) -> String {
        if response.is_failure() {
            format!("ERROR {}", response.status_text)
        } else {
            format!("HTTP {} {}", response.status, response.status_text)
        }
    }

    fn paint(&self, text: &str, hex: &str) -> ColoredString {
        match hex_to_rgb(hex) {
            Some((r, g, b)) if self.color => text.truecolor(r, g, b),
            _ => text.normal(),
        }
    }

    fn emphasis(&self, text: ColoredString) -> ColoredString {
        if self.color {
            text.bold()
        } else {
            text
        }
    }

    fn timing_line(&self, response: &ResponseRecord) -> String {
        let timing = format!("Time: {}ms  Size: {} B", response.time, response.size);
        self.paint(&timing, self.tokens.info).to_string()
    }

    fn format_compact(&self, response: &ResponseRecord) -> String {
        let mut output = Vec::new();
        let status_line = self.status_line(response);
        output.push(
            self.paint(&status_line, self.tokens.status_color(response.status))
                .to_string(),
        );
        if self.show_timing {
            output.push(self.timing_line(response));
        }

        if self.show_body {
            let body = &response.data;
            if !body.is_empty() && body.len() < 200 {
                // 尝试格式化 JSON，失败则显示原始内容
                let formatted_body = try_format_json(body).unwrap_or_else(|| body.to_string());
                output.push(formatted_body);
            } else if !body.is_empty() {
                output.push(format!("Body: {} bytes", body.len()));
            }
        }

        output.join("\n")
    }

    fn format_verbose(&self, response: &ResponseRecord) -> String {
        let mut output = Vec::new();
        let status_line = self.status_line(response);
        let status = self.paint(&status_line, self.tokens.status_color(response.status));
        output.push(self.emphasis(status).to_string());
        if self.show_timing {
            output.push(self.timing_line(response));
        }
        if self.show_headers && !response.headers.is_empty() {
            output.push("".to_string());
            output.push(
                self.emphasis(self.paint("Headers:", self.tokens.accent))
                    .to_string(),
            );
            for (key, value) in &response.headers {
                let line = format!("   {}: {}", key, value);
                output.push(self.paint(&line, self.tokens.muted).to_string());
            }
        }

        if self.show_body {
            let body = &response.data;
            if !body.is_empty() {
                output.push("".to_string());
                output.push(self.emphasis(self.paint("Body:", self.tokens.accent)).to_string());
                // 尝试格式化 JSON，失败则显示原始内容
                let formatted_body = try_format_json(body).unwrap_or_else(|| body.to_string());
                output.push(formatted_body);
            }
        }

        output.join("\n")
    }
}

/// 尝试将 body 格式化为漂亮的 JSON
/// 如果不是有效的 JSON，返回 None
fn try_format_json(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    serde_json::to_string_pretty(&value).ok()
}
