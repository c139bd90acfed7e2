use std::fmt;

use crate::settings::Language;

/// 面向用户的提示信息
///
/// 校验失败和操作结果都通过 Notice 返回给调用方，由界面层按当前语言显示。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    UrlRequired,
    ApiNameRequired,
    CollectionNameRequired,
    ApiSaved,
    CollectionCreated,
    CollectionDeleted,
    RequestDeleted,
    HistoryDeleted,
    HistoryCleared,
    ReplayStaged,
    SettingsSaved,
}

impl Notice {
    pub fn text(&self, language: Language) -> &'static str {
        match language {
            Language::Zh => self.zh(),
            Language::En => self.en(),
        }
    }

    fn en(&self) -> &'static str {
        match self {
            Notice::UrlRequired => "Please enter URL first",
            Notice::ApiNameRequired => "Please enter API name",
            Notice::CollectionNameRequired => "Please enter collection name",
            Notice::ApiSaved => "API successfully saved to collection",
            Notice::CollectionCreated => "Collection created successfully",
            Notice::CollectionDeleted => "Collection deleted successfully",
            Notice::RequestDeleted => "Request deleted successfully",
            Notice::HistoryDeleted => "History record deleted",
            Notice::HistoryCleared => "History cleared",
            Notice::ReplayStaged => "Request loaded into the builder",
            Notice::SettingsSaved => "Settings saved",
        }
    }

    fn zh(&self) -> &'static str {
        match self {
            Notice::UrlRequired => "请先输入URL",
            Notice::ApiNameRequired => "请输入API名称",
            Notice::CollectionNameRequired => "请输入集合名称",
            Notice::ApiSaved => "API已成功保存到集合中",
            Notice::CollectionCreated => "集合创建成功",
            Notice::CollectionDeleted => "集合删除成功",
            Notice::RequestDeleted => "请求删除成功",
            Notice::HistoryDeleted => "历史记录已删除",
            Notice::HistoryCleared => "历史记录已清空",
            Notice::ReplayStaged => "请求已载入构建器",
            Notice::SettingsSaved => "设置已保存",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.en())
    }
}
