//! Translation tables and the `t(key, vars)` lookup.
//!
//! Lookups fall back to the Chinese table and then to the key itself, and
//! `{name}` placeholders are replaced from `vars` (unknown names become empty).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Zh,
    En,
}

impl Language {
    pub fn all() -> &'static [Language] {
        &[Language::Zh, Language::En]
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Language::Zh => "zh",
            Language::En => "en",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Language> {
        match tag {
            "zh" => Some(Language::Zh),
            "en" => Some(Language::En),
            _ => None,
        }
    }

    #[must_use]
    pub fn next(&self) -> Language {
        match self {
            Language::Zh => Language::En,
            Language::En => Language::Zh,
        }
    }

    /// Startup choice: the stored tag if any (unknown tags fall back to
    /// Chinese), otherwise derived from the locale.
    pub fn resolve(stored: Option<&str>, locale: Option<&str>) -> Language {
        match stored.map(str::trim).filter(|s| !s.is_empty()) {
            Some(tag) => Language::from_tag(tag).unwrap_or(Language::Zh),
            None => {
                let locale = locale.unwrap_or_default().to_lowercase();
                if locale.starts_with("zh") {
                    Language::Zh
                } else {
                    Language::En
                }
            }
        }
    }

    /// Locale as reported by the environment, most specific first.
    pub fn system_locale() -> Option<String> {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.is_empty())
    }

    fn table(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Language::Zh => ZH,
            Language::En => EN,
        }
    }
}

/// Translate `key` in `lang`, substituting `{var}` placeholders.
pub fn t(lang: Language, key: &str, vars: &[(&str, &str)]) -> String {
    let template = lookup(lang.table(), key)
        .or_else(|| lookup(ZH, key))
        .unwrap_or(key);
    substitute(template, vars)
}

fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

fn substitute(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close)
                if close > 0
                    && after[..close]
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_') =>
            {
                let name = &after[..close];
                if let Some((_, value)) = vars.iter().find(|(k, _)| *k == name) {
                    out.push_str(value);
                }
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

const ZH: &[(&str, &str)] = &[
    ("title.page", "Fail2Ban 管理面板"),
    ("btn.new", "新建"),
    ("btn.delete", "删除"),
    ("btn.edit", "编辑"),
    ("btn.reload", "重载"),
    ("btn.refresh", "刷新"),
    ("btn.audit", "审计"),
    ("btn.close", "关闭"),
    ("btn.confirm", "确认"),
    ("btn.cancel", "取消"),
    ("btn.add", "添加"),
    ("btn.clear", "清空"),
    ("btn.export", "导出"),
    ("btn.import", "导入"),
    ("modal.editTitle", "编辑 Jail"),
    ("modal.save", "保存"),
    ("modal.cancel", "取消"),
    ("modal.msg", "消息"),
    ("modal.confirmTitle", "确认"),
    ("modal.auditTitle", "审计日志"),
    ("modal.importTitle", "导入被封 IP"),
    ("placeholder.jailContent", "在此编辑 / 粘贴 jail 配置"),
    ("placeholder.banInput", "输入 IP 地址 或 CIDR"),
    ("placeholder.auditFilter", "按关键字过滤"),
    ("placeholder.importPath", "输入 .json 或文本文件路径"),
    ("default.jailContent", "[DEFAULT]\n"),
    ("msg.selectFirst", "请先选择一个 jail"),
    ("msg.deleteConfirm", "确认删除 jail: {jail} ?"),
    ("msg.deleteSuccess", "删除成功"),
    ("msg.deleteFail", "删除失败"),
    ("msg.saveSuccess", "保存成功"),
    ("msg.saveFail", "保存失败: {err}"),
    ("msg.reloadSuccess", "重载成功"),
    ("msg.reloadFail", "重载失败: {err}"),
    ("msg.fetchStatusFail", "获取状态失败: {err}"),
    ("msg.nameExists", "名称已存在: {name}"),
    ("msg.formMissing", "配置信息无效，请重新编辑。"),
    ("msg.banSuccess", "封禁成功"),
    ("msg.banFail", "封禁失败"),
    ("msg.unbanSuccess", "解除封禁成功"),
    ("msg.unbanFail", "解除封禁失败"),
    ("msg.clearConfirm", "清空 {jail} 的全部封禁 ?"),
    ("msg.auditClearConfirm", "清空审计日志 ?"),
    ("msg.clearSuccess", "清空完成"),
    ("msg.clearFail", "部分解除封禁失败"),
    ("msg.importSuccess", "导入完成"),
    ("msg.importFail", "导入过程中出现错误"),
    ("msg.exportSuccess", "已导出到 {path}"),
    ("msg.exportFail", "导出失败"),
    ("label.jailName", "jail 名称:"),
    ("label.jailContent", "配置内容:"),
    ("label.readonly", "（只读）"),
    ("label.auditFilter", "过滤:"),
    ("label.importPath", "文件路径:"),
    ("lang.zh", "中文"),
    ("lang.en", "English"),
    ("theme.system", "跟随系统"),
    ("theme.light", "亮模式"),
    ("theme.dark", "暗模式"),
    ("aria.langSelect", "语言"),
    ("aria.themeSelect", "主题"),
    ("col.name", "名称"),
    ("col.state", "状态"),
    ("col.count", "被封 IP 数"),
    ("col.list", "被封 IP 列表"),
    ("state.enabled", "已启用"),
    ("state.disabled", "已禁用"),
    ("status.ready", "就绪"),
    ("status.pending", "{count} 个请求处理中"),
    ("hint.main", "↑↓ 选择  Enter 封禁列表  n 新建  e 编辑  d 删除  r 重载  F5 刷新  a 审计  l 语言  t 主题  q 退出"),
    ("hint.dialog", "Tab/Shift+Tab 切换  Enter 执行  Esc 关闭"),
    ("none", "-"),
];

const EN: &[(&str, &str)] = &[
    ("title.page", "Fail2Ban Manager"),
    ("btn.new", "New"),
    ("btn.delete", "Delete"),
    ("btn.edit", "Edit"),
    ("btn.reload", "Reload"),
    ("btn.refresh", "Refresh"),
    ("btn.audit", "Audit"),
    ("btn.close", "Close"),
    ("btn.confirm", "Confirm"),
    ("btn.cancel", "Cancel"),
    ("btn.add", "Add"),
    ("btn.clear", "Clear"),
    ("btn.export", "Export"),
    ("btn.import", "Import"),
    ("modal.editTitle", "Edit Jail"),
    ("modal.save", "Save"),
    ("modal.cancel", "Cancel"),
    ("modal.msg", "Message"),
    ("modal.confirmTitle", "Confirm"),
    ("modal.auditTitle", "Audit Log"),
    ("modal.importTitle", "Import Banned IPs"),
    ("placeholder.jailContent", "Edit / paste jail configuration here"),
    ("placeholder.banInput", "Enter IP address or CIDR"),
    ("placeholder.auditFilter", "Filter by keyword"),
    ("placeholder.importPath", "Path to a .json or text file"),
    ("default.jailContent", "[DEFAULT]\n"),
    ("msg.selectFirst", "Please select a jail first"),
    ("msg.deleteConfirm", "Delete jail: {jail} ?"),
    ("msg.deleteSuccess", "Deleted"),
    ("msg.deleteFail", "Delete failed"),
    ("msg.saveSuccess", "Saved"),
    ("msg.saveFail", "Save failed: {err}"),
    ("msg.reloadSuccess", "Reload succeeded"),
    ("msg.reloadFail", "Reload failed: {err}"),
    ("msg.fetchStatusFail", "Failed to fetch status: {err}"),
    ("msg.nameExists", "Name already exists: {name}"),
    ("msg.formMissing", "Invalid configuration, please edit again."),
    ("msg.banSuccess", "Banned"),
    ("msg.banFail", "Ban failed"),
    ("msg.unbanSuccess", "Unbanned"),
    ("msg.unbanFail", "Unban failed"),
    ("msg.clearConfirm", "Clear all bans of {jail} ?"),
    ("msg.auditClearConfirm", "Clear the audit log ?"),
    ("msg.clearSuccess", "Cleared"),
    ("msg.clearFail", "Some unban operations failed"),
    ("msg.importSuccess", "Import completed"),
    ("msg.importFail", "Import encountered errors"),
    ("msg.exportSuccess", "Exported to {path}"),
    ("msg.exportFail", "Export failed"),
    ("label.jailName", "Jail Name:"),
    ("label.jailContent", "Content:"),
    ("label.readonly", "(read-only)"),
    ("label.auditFilter", "Filter:"),
    ("label.importPath", "File path:"),
    ("lang.zh", "中文"),
    ("lang.en", "English"),
    ("theme.system", "System"),
    ("theme.light", "Light"),
    ("theme.dark", "Dark"),
    ("aria.langSelect", "Language"),
    ("aria.themeSelect", "Theme"),
    ("col.name", "Name"),
    ("col.state", "State"),
    ("col.count", "Banned Count"),
    ("col.list", "Banned List"),
    ("state.enabled", "Enabled"),
    ("state.disabled", "Disabled"),
    ("status.ready", "Ready"),
    ("status.pending", "{count} request(s) pending"),
    ("hint.main", "↑↓ Select  Enter Banned list  n New  e Edit  d Delete  r Reload  F5 Refresh  a Audit  l Language  t Theme  q Quit"),
    ("hint.dialog", "Tab/Shift+Tab Move  Enter Activate  Esc Close"),
    ("none", "-"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_substituted() {
        assert_eq!(
            t(Language::En, "msg.nameExists", &[("name", "sshd")]),
            "Name already exists: sshd"
        );
        assert_eq!(t(Language::En, "msg.saveFail", &[]), "Save failed: ");
    }

    #[test]
    fn unknown_key_falls_back_to_key() {
        assert_eq!(t(Language::En, "no.such.key", &[]), "no.such.key");
    }

    #[test]
    fn stray_braces_are_kept() {
        assert_eq!(substitute("a {b c} {} {", &[("b", "x")]), "a {b c} {} {");
    }

    #[test]
    fn tables_cover_the_same_keys() {
        for (key, _) in ZH {
            assert!(lookup(EN, key).is_some(), "missing en key {}", key);
        }
        for (key, _) in EN {
            assert!(lookup(ZH, key).is_some(), "missing zh key {}", key);
        }
    }

    #[test]
    fn startup_language_resolution() {
        assert_eq!(Language::resolve(Some("en"), Some("zh_CN.UTF-8")), Language::En);
        assert_eq!(Language::resolve(Some("fr"), None), Language::Zh);
        assert_eq!(Language::resolve(None, Some("zh_TW.UTF-8")), Language::Zh);
        assert_eq!(Language::resolve(Some(""), Some("en_US.UTF-8")), Language::En);
        assert_eq!(Language::resolve(None, None), Language::En);
    }
}
