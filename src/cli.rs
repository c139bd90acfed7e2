use std::io::IsTerminal;

use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand};
use colored::*;

use reqlab::builder::{RequestBuilder, SendOutcome};
use reqlab::collection::printer::{collections_table, requests_table};
use reqlab::collection::{CollectionStorage, SaveTarget};
use reqlab::history::printer::{key_value_table, list_history};
use reqlab::history::selector::{SelectionStrategy, select_entry};
use reqlab::history::HistoryStorage;
use reqlab::http::types::normalize_url;
use reqlab::http::{BodyType, Client, KeyValue, Method, RequestModel};
use reqlab::i18n::Notice;
use reqlab::replay::{Replayable, RetryBridge};
use reqlab::settings::{AppContext, Language, Theme};
use reqlab::utils::{ResponseFormat, ResponseFormatter};

pub type Result<T> = std::result::Result<T, anyhow::Error>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// 可选参数用于默认运行(curl/httpie 风格)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 发送请求；未给出 URL 时使用暂存的重放请求
    Send(SendArgs),
    /// 请求历史
    #[command(subcommand)]
    History(HistoryCommand),
    /// API 集合
    #[command(subcommand)]
    Collection(CollectionCommand),
    /// 偏好设置
    #[command(subcommand)]
    Settings(SettingsCommand),
}

/// 描述一个请求的公共参数
#[derive(Args, Default)]
pub struct RequestArgs {
    /// HTTP 方法
    #[arg(short = 'X', long)]
    pub method: Option<String>,

    pub url: Option<String>,

    /// 请求头 "Key: value"
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// 查询参数 "key=value"，可重复
    #[arg(short = 'q', long = "query")]
    pub params: Vec<String>,

    /// 请求体，原样发送
    #[arg(short = 'd', long = "data")]
    pub body: Option<String>,

    /// json | form | xml | text
    #[arg(long)]
    pub body_type: Option<String>,
}

#[derive(Args)]
pub struct SendArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    #[arg(short, long)]
    pub verbose: bool,

    #[command(flatten)]
    pub save: SaveArgs,
}

#[derive(Args, Default)]
pub struct SaveArgs {
    /// 发送后保存到集合
    #[arg(long)]
    pub save: bool,

    /// API 名称，默认取 URL 路径最后一段
    #[arg(long, requires = "save")]
    pub name: Option<String>,

    /// 目标集合 ID（默认第一个集合）
    #[arg(long, requires = "save", conflicts_with = "new_collection")]
    pub collection: Option<i64>,

    /// 新建集合并保存
    #[arg(long, requires = "save")]
    pub new_collection: Option<String>,
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// 列出最近的历史记录
    List {
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },
    /// 查看一条记录的完整响应
    Show { id: i64 },
    /// 删除一条记录
    Delete {
        id: i64,
        #[arg(short, long)]
        yes: bool,
    },
    /// 清空全部历史
    Clear {
        #[arg(short, long)]
        yes: bool,
    },
    /// 重放一条记录（不指定 ID 时交互选择）
    Retry {
        id: Option<i64>,
        /// 只暂存，下次 `send` 时载入
        #[arg(long)]
        stage_only: bool,
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Subcommand)]
pub enum CollectionCommand {
    List,
    Show {
        id: i64,
    },
    Create {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    Delete {
        id: i64,
        #[arg(short, long)]
        yes: bool,
    },
    /// 从集合中删除一个请求
    Remove {
        collection: i64,
        request: i64,
        #[arg(short, long)]
        yes: bool,
    },
    /// 保存请求到集合，不发送
    Add {
        #[command(flatten)]
        request: RequestArgs,

        /// API 名称，默认取 URL 路径最后一段
        #[arg(long)]
        name: Option<String>,

        /// 目标集合 ID（默认第一个集合）
        #[arg(long, conflicts_with = "new_collection")]
        collection: Option<i64>,

        /// 新建集合并保存
        #[arg(long)]
        new_collection: Option<String>,
    },
    /// 执行集合中的请求
    Run {
        collection: i64,
        request: i64,
        #[arg(long)]
        stage_only: bool,
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommand {
    Show,
    Set {
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        theme: Option<String>,
        #[arg(long)]
        auto_save: Option<bool>,
    },
}

struct CliRunner<'a> {
    ctx: &'a mut AppContext,
}

impl<'a> CliRunner<'a> {
    fn new(ctx: &'a mut AppContext) -> Self {
        Self { ctx }
    }

    fn notice(&self, notice: Notice) {
        println!("{}", notice.text(self.ctx.language()).green());
    }

    fn confirm(&self, prompt: &str, yes: bool) -> Result<bool> {
        if yes {
            return Ok(true);
        }
        inquire::Confirm::new(prompt)
            .with_default(false)
            .prompt()
            .context("confirmation aborted")
    }

    fn history(&self) -> HistoryStorage {
        HistoryStorage::new(self.ctx.store().clone())
    }

    fn collections(&self) -> CollectionStorage {
        CollectionStorage::new(self.ctx.store().clone())
    }

    fn formatter(&self, verbose: bool) -> ResponseFormatter {
        let format = if verbose {
            ResponseFormat::Verbose
        } else {
            ResponseFormat::Compact
        };
        ResponseFormatter::new(format).with_tokens(*self.ctx.tokens())
    }

    /// 打开构建器并载入暂存的重放请求（如果有）
    fn open_staged(&self, client: Client) -> RequestBuilder<'_> {
        let builder = RequestBuilder::open(&*self.ctx, client);
        if builder.replayed() {
            self.notice(Notice::ReplayStaged);
        }
        builder
    }

    /// 发送构建器中的请求；Ctrl-C 取消进行中的请求
    async fn send_with(
        &self,
        mut builder: RequestBuilder<'_>,
        verbose: bool,
        save: &SaveArgs,
    ) -> Result<()> {
        let token = builder.cancel_token();
        let ctrl_c = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        });
        let outcome = builder.send().await;
        ctrl_c.abort();

        match outcome? {
            SendOutcome::Completed { response, history } => {
                println!("{}", self.formatter(verbose).format(&response));
                if let Some(entry) = history {
                    tracing::debug!("Recorded history entry {}", entry.id);
                }
            }
            SendOutcome::Cancelled => {
                eprintln!("{}", "Request cancelled".yellow());
                return Ok(());
            }
        }

        if save.save {
            self.save_request(
                &builder,
                save.name.as_deref(),
                save.collection,
                save.new_collection.as_deref(),
            )?;
        }
        Ok(())
    }

    fn save_request(
        &self,
        builder: &RequestBuilder<'_>,
        name: Option<&str>,
        collection: Option<i64>,
        new_collection: Option<&str>,
    ) -> Result<()> {
        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| builder.request().suggested_name());

        let target = match (new_collection, collection) {
            (Some(name), _) => SaveTarget::New { name: name.to_string() },
            (None, Some(id)) => SaveTarget::Existing(id),
            (None, None) => match self.collections().list()?.first() {
                Some(first) => SaveTarget::Existing(first.id),
                None => {
                    return Err(reqlab::ReqlabError::Validation(
                        Notice::CollectionNameRequired,
                    )
                    .into());
                }
            },
        };

        let saved = builder.save(&name, target)?;
        self.notice(Notice::ApiSaved);
        println!("{} {}", saved.id, saved.name.bold());
        Ok(())
    }

    async fn run_send(&self, args: SendArgs) -> Result<()> {
        let SendArgs {
            request,
            verbose,
            save,
        } = args;
        let client = Client::new()?;

        // 给出 URL 时是一个全新的请求，暂存的重放请求留给下一次
        let builder = if request.url.is_some() {
            RequestBuilder::with_request(&*self.ctx, client, request.build()?)
        } else {
            let mut builder = self.open_staged(client);
            request.apply(builder.request_mut())?;
            builder
        };

        self.send_with(builder, verbose, &save).await
    }

    /// 暂存后立即打开构建器执行（等同于跳转到构建器页面）
    async fn replay(&self, item: &impl Replayable, stage_only: bool, verbose: bool) -> Result<()> {
        RetryBridge::new(self.ctx.store().clone()).stage(item)?;
        if stage_only {
            self.notice(Notice::ReplayStaged);
            return Ok(());
        }
        let builder = self.open_staged(Client::new()?);
        self.send_with(builder, verbose, &SaveArgs::default()).await
    }

    async fn run_history(&self, command: HistoryCommand) -> Result<()> {
        let storage = self.history();
        match command {
            HistoryCommand::List { limit } => {
                list_history(&storage, limit, self.ctx.tokens())?;
            }
            HistoryCommand::Show { id } => {
                let entry = storage
                    .get(id)?
                    .ok_or_else(|| anyhow!("History entry {} not found", id))?;
                println!(
                    "{} {}  ({})",
                    entry.request.method.to_string().bold(),
                    entry.request.url,
                    entry.timestamp.to_rfc3339()
                );
                if entry.request.params.iter().any(|p| !p.is_blank()) {
                    println!("Params:\n{}", key_value_table(&entry.request.params));
                }
                if entry.request.headers.iter().any(|h| !h.is_blank()) {
                    println!("Headers:\n{}", key_value_table(&entry.request.headers));
                }
                println!("{}", self.formatter(true).format(&entry.response));
            }
            HistoryCommand::Delete { id, yes } => {
                if self.confirm("Delete this history record?", yes)? {
                    if !storage.delete(id)? {
                        return Err(anyhow!("History entry {} not found", id));
                    }
                    self.notice(Notice::HistoryDeleted);
                }
            }
            HistoryCommand::Clear { yes } => {
                if self.confirm("Clear all history? This cannot be undone.", yes)? {
                    storage.clear()?;
                    self.notice(Notice::HistoryCleared);
                }
            }
            HistoryCommand::Retry {
                id,
                stage_only,
                verbose,
            } => {
                let strategy = match id {
                    Some(id) => SelectionStrategy::Id(id),
                    None if std::io::stdin().is_terminal() => SelectionStrategy::Interactive,
                    None => SelectionStrategy::Latest,
                };
                let entry = select_entry(&storage, strategy)?
                    .ok_or_else(|| anyhow!("No matching history entry"))?;
                self.replay(&entry, stage_only, verbose).await?;
            }
        }
        Ok(())
    }

    async fn run_collection(&self, command: CollectionCommand) -> Result<()> {
        let storage = self.collections();
        match command {
            CollectionCommand::List => {
                println!("{}", collections_table(&storage.list()?));
            }
            CollectionCommand::Show { id } => {
                let collection = storage
                    .get(id)?
                    .ok_or_else(|| anyhow!("Collection {} not found", id))?;
                println!("{}", collection.name.bold());
                if !collection.description.is_empty() {
                    println!("{}", collection.description.dimmed());
                }
                println!("{}", requests_table(&collection, self.ctx.tokens()));
            }
            CollectionCommand::Create { name, description } => {
                let collection = storage.create(&name, &description)?;
                self.notice(Notice::CollectionCreated);
                println!("{} {}", collection.id, collection.name.bold());
            }
            CollectionCommand::Delete { id, yes } => {
                if self.confirm("Delete this collection and all its requests?", yes)? {
                    if !storage.delete(id)? {
                        return Err(anyhow!("Collection {} not found", id));
                    }
                    self.notice(Notice::CollectionDeleted);
                }
            }
            CollectionCommand::Remove {
                collection,
                request,
                yes,
            } => {
                if self.confirm("Delete this request?", yes)? {
                    if !storage.delete_request(collection, request)? {
                        return Err(anyhow!("Request {} not found", request));
                    }
                    self.notice(Notice::RequestDeleted);
                }
            }
            CollectionCommand::Add {
                request,
                name,
                collection,
                new_collection,
            } => {
                let builder =
                    RequestBuilder::with_request(&*self.ctx, Client::new()?, request.build()?);
                self.save_request(
                    &builder,
                    name.as_deref(),
                    collection,
                    new_collection.as_deref(),
                )?;
            }
            CollectionCommand::Run {
                collection,
                request,
                stage_only,
                verbose,
            } => {
                let saved = storage
                    .find_request(collection, request)?
                    .ok_or_else(|| anyhow!("Request {} not found", request))?;
                self.replay(&saved, stage_only, verbose).await?;
            }
        }
        Ok(())
    }

    fn run_settings(&mut self, command: SettingsCommand) -> Result<()> {
        match command {
            SettingsCommand::Show => {
                let prefs = self.ctx.preferences();
                println!("language  = {}", prefs.language);
                println!("theme     = {}", prefs.theme);
                println!("autoSave  = {}", prefs.auto_save);
            }
            SettingsCommand::Set {
                language,
                theme,
                auto_save,
            } => {
                if let Some(language) = language {
                    self.ctx.set_language(language.parse::<Language>()?)?;
                }
                if let Some(theme) = theme {
                    self.ctx.set_theme(theme.parse::<Theme>()?)?;
                }
                if let Some(auto_save) = auto_save {
                    self.ctx.set_auto_save(auto_save)?;
                }
                self.notice(Notice::SettingsSaved);
            }
        }
        Ok(())
    }

    async fn run_args(&self, args: Vec<String>) -> Result<()> {
        let request = parse_args(args)?;
        let builder = RequestBuilder::with_request(&*self.ctx, Client::new()?, request);
        self.send_with(builder, false, &SaveArgs::default()).await
    }
}

impl RequestArgs {
    /// 从空请求开始构建
    fn build(self) -> Result<RequestModel> {
        let mut request = RequestModel::default();
        self.apply(&mut request)?;
        Ok(request)
    }

    /// 把命令行给出的部分覆盖到 `request` 上；请求头和查询参数追加在已有行之后
    fn apply(self, request: &mut RequestModel) -> Result<()> {
        if let Some(method) = self.method {
            request.method = method.parse()?;
        }
        if let Some(url) = self.url {
            request.url = normalize_url(&url);
        }
        for header in self.headers {
            let (key, value) = header
                .split_once(':')
                .ok_or_else(|| anyhow!("Invalid header (expected Key: value): {}", header))?;
            request.headers.push(KeyValue::new(key.trim(), value.trim()));
        }
        for param in self.params {
            let (key, value) = param
                .split_once('=')
                .ok_or_else(|| anyhow!("Invalid query (expected key=value): {}", param))?;
            request.params.push(KeyValue::new(key, value));
        }
        if let Some(body) = self.body {
            request.body = body;
        }
        if let Some(body_type) = self.body_type {
            request.body_type = body_type.parse()?;
        }
        Ok(())
    }
}

fn parse_args(mut args: Vec<String>) -> Result<RequestModel> {
    match args.first().map(String::as_str) {
        Some("curl") => {
            args.remove(0);
            return parse_curl(args);
        }
        Some("http") => {
            args.remove(0);
        }
        _ => {}
    }

    if args.iter().any(|a| a.starts_with('-')) {
        parse_curl(args)
    } else {
        parse_httpie(args)
    }
}

fn parse_curl(args: Vec<String>) -> Result<RequestModel> {
    let mut method: Option<Method> = None;
    let mut url = String::new();
    let mut headers = Vec::new();
    let mut body = String::new();
    let mut force_get = false;

    let mut args_iter = args.into_iter();

    while let Some(arg) = args_iter.next() {
        match arg.as_str() {
            // HTTP Method
            "-X" | "--request" => {
                if let Some(m) = args_iter.next() {
                    method = Some(m.parse()?);
                }
            }
            // Header
            "-H" | "--header" => {
                if let Some((key, value)) = args_iter.next().as_deref().and_then(|h| h.split_once(':')) {
                    headers.push(KeyValue::new(key.trim(), value.trim()));
                }
            }
            // Data (body)
            "-d" | "--data" | "--data-raw" => {
                if let Some(data) = args_iter.next() {
                    body = data;
                }
            }
            // Force GET even with data
            "-G" | "--get" => {
                force_get = true;
            }
            // 其他未知选项暂时忽略
            s if s.starts_with('-') => {
                // 如果是 -X=POST 这种形式
                if let Some((opt, val)) = s.split_once('=') {
                    match opt {
                        "-X" | "--request" => method = Some(val.parse()?),
                        "-d" | "--data" | "--data-raw" => body = val.to_string(),
                        _ => {} // 忽略其他选项
                    }
                }
            }
            // URL (位置参数)
            _ => {
                if url.is_empty() {
                    url = arg;
                }
            }
        }
    }

    if url.is_empty() {
        return Err(anyhow!("URL is required"));
    }

    let mut request = RequestModel::new(Method::Get, normalize_url(&url));
    request.headers = headers;

    if force_get {
        // -G 把数据放到查询参数里
        for pair in body.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            request.params.push(KeyValue::new(key, value));
        }
        request.method = method.unwrap_or(Method::Get);
        return Ok(request);
    }

    // 如果有 body 且未指定方法，默认使用 POST
    request.method = match method {
        Some(m) => m,
        None if !body.is_empty() => Method::Post,
        None => Method::Get,
    };

    let json_declared = request.headers.iter().any(|h| {
        h.key.eq_ignore_ascii_case("content-type") && h.value.contains("json")
    });
    request.body_type = if json_declared || serde_json::from_str::<serde_json::Value>(&body).is_ok() {
        BodyType::Json
    } else {
        BodyType::Form
    };
    request.body = body;

    Ok(request)
}

/// 判断参数是否为键值对参数（headers, query, body）
/// URL 格式不算键值对：http://, https://, :/, :port
fn is_key_value_param(arg: &str) -> bool {
    // 先排除 URL 模式
    // 1. http:// 或 https://
    if arg.starts_with("http://") || arg.starts_with("https://") {
        return false;
    }
    // 2. :/ 开头的本地路径简写 (如 :/api -> localhost/api)
    if arg.starts_with(":/") {
        return false;
    }
    // 3. :port 格式 (如 :3000 -> localhost:3000)
    if arg.starts_with(':') && arg[1..].chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    // 4. 包含 :// 的 URL（其他协议）
    if arg.contains("://") {
        return false;
    }
    // 5. 域名:端口 格式 (如 example.com:8080)
    if let Some((host, port)) = arg.rsplit_once(':') {
        // 如果冒号后面全是数字，且前面不为空，认为是 host:port
        if !host.is_empty() && port.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
    }

    // 按优先级检查键值对分隔符：== :=  = :
    // 注意：需要先检查多字符分隔符
    arg.contains("==") || arg.contains(":=") || arg.contains('=') || arg.contains(':')
}

fn parse_httpie(args: Vec<String>) -> Result<RequestModel> {
    let mut method: Option<Method> = None;
    let mut url = String::new();
    let mut request = RequestModel::default();
    let mut body_parts = serde_json::Map::new();

    let mut args_iter = args.into_iter().peekable();

    // Step 1: 检查第一个参数是否为 HTTP Method
    if let Some(parsed) = args_iter.peek().and_then(|first| Method::parse(first).ok()) {
        method = Some(parsed);
        args_iter.next();
    }

    // Step 2: 下一个非键值对参数即为 URL
    if let Some(next) = args_iter.next_if(|next| !is_key_value_param(next)) {
        url = next;
    }

    // Step 3: 处理剩余的键值对参数
    for arg in args_iter {
        if let Some((key, value)) = arg.split_once("==") {
            // Query parameter
            request.params.push(KeyValue::new(key, value));
        } else if let Some((key, value)) = arg.split_once(":=") {
            // Raw JSON field
            body_parts.insert(
                key.to_string(),
                serde_json::from_str::<serde_json::Value>(value)
                    .unwrap_or(serde_json::Value::String(value.to_string())),
            );
        } else if let Some((key, value)) = arg.split_once('=') {
            // String data field
            body_parts.insert(
                key.to_string(),
                serde_json::Value::String(value.to_string()),
            );
        } else if let Some((key, value)) = arg.split_once(':') {
            // Header
            request.headers.push(KeyValue::new(key, value));
        }
        // 非键值对参数在 Step 2 之后应该不存在，忽略
    }

    if url.is_empty() {
        return Err(anyhow!("URL is required"));
    }
    request.url = normalize_url(&url);

    // If body_parts is not empty, method implicitly becomes POST
    request.method = match method {
        Some(m) => m,
        None if !body_parts.is_empty() => Method::Post,
        None => Method::Get,
    };
    if !body_parts.is_empty() {
        request.body = serde_json::Value::Object(body_parts).to_string();
        request.body_type = BodyType::Json;
    }

    Ok(request)
}

pub async fn run(cli: Cli, ctx: &mut AppContext) -> Result<()> {
    let mut runner = CliRunner::new(ctx);
    match cli.command {
        Some(Commands::Send(args)) => runner.run_send(args).await,
        Some(Commands::History(command)) => runner.run_history(command).await,
        Some(Commands::Collection(command)) => runner.run_collection(command).await,
        Some(Commands::Settings(command)) => runner.run_settings(command),
        None if cli.args.is_empty() => {
            // 没有参数时发送暂存的重放请求（如果有）
            runner.run_send(SendArgs::empty()).await
        }
        None => runner.run_args(cli.args).await,
    }
}

impl SendArgs {
    fn empty() -> Self {
        Self {
            request: RequestArgs::default(),
            verbose: false,
            save: SaveArgs::default(),
        }
    }
}
