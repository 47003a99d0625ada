//! Seed data written on the first read of an empty store.

use crate::model::{AiConfig, AiProvider, CardStyle, Category, Link, SearchEngine, SiteSettings};

pub const DEFAULT_AI_MODEL: &str = "gemini-2.5-flash";

/// Base site settings. Nested AI and search-engine config are left unset so a
/// partially specified settings object does not pick them up implicitly.
pub fn site_settings() -> SiteSettings {
    SiteSettings {
        title: "HaoNav - 我的导航".to_string(),
        nav_title: "HaoNav".to_string(),
        favicon: String::new(),
        card_style: CardStyle::Detailed,
        ai_config: None,
        search_engines: None,
    }
}

/// Settings persisted on first run.
pub fn initial_settings() -> SiteSettings {
    SiteSettings {
        ai_config: Some(ai_config()),
        search_engines: Some(search_engines()),
        ..site_settings()
    }
}

pub fn ai_config() -> AiConfig {
    AiConfig {
        provider: AiProvider::Gemini,
        api_key: String::new(),
        base_url: String::new(),
        model: DEFAULT_AI_MODEL.to_string(),
    }
}

pub fn categories() -> Vec<Category> {
    [
        ("common", "常用推荐", "Folder"),
        ("dev", "开发工具", "LayoutPanelLeft"),
        ("design", "设计资源", "Palette"),
        ("read", "阅读资讯", "BookOpen"),
        ("ent", "休闲娱乐", "Gamepad2"),
        ("ai", "人工智能", "Bot"),
    ]
    .into_iter()
    .map(|(id, name, icon)| Category {
        id: id.to_string(),
        name: name.to_string(),
        icon: icon.to_string(),
        password: None,
    })
    .collect()
}

pub fn links(created_at: i64) -> Vec<Link> {
    [
        ("1", "GitHub", "https://github.com", "dev", "代码托管平台", true),
        ("2", "React", "https://react.dev", "dev", "构建Web用户界面的库", false),
        ("3", "Tailwind CSS", "https://tailwindcss.com", "design", "原子化CSS框架", false),
        ("4", "ChatGPT", "https://chat.openai.com", "ai", "OpenAI聊天机器人", true),
        ("5", "Gemini", "https://gemini.google.com", "ai", "Google DeepMind AI", false),
    ]
    .into_iter()
    .map(|(id, title, url, category_id, description, pinned)| Link {
        id: id.to_string(),
        title: title.to_string(),
        url: url.to_string(),
        icon: None,
        description: Some(description.to_string()),
        category_id: category_id.to_string(),
        created_at,
        pinned: pinned.then_some(true),
        pinned_order: None,
    })
    .collect()
}

pub fn search_engines() -> Vec<SearchEngine> {
    [
        ("local", "站内", "", "Search"),
        ("google", "Google", "https://www.google.com/search?q=", "https://www.google.com/favicon.ico"),
        ("bing", "必应", "https://www.bing.com/search?q=", "https://www.bing.com/favicon.ico"),
        ("baidu", "百度", "https://www.baidu.com/s?wd=", "https://www.baidu.com/favicon.ico"),
        ("github", "GitHub", "https://github.com/search?q=", "https://github.com/favicon.ico"),
        ("bilibili", "B站", "https://search.bilibili.com/all?keyword=", "https://www.bilibili.com/favicon.ico"),
    ]
    .into_iter()
    .map(|(id, name, url, icon)| SearchEngine {
        id: id.to_string(),
        name: name.to_string(),
        url: url.to_string(),
        icon: icon.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_links_reference_default_categories() {
        let categories = categories();
        for link in links(0) {
            assert!(categories.iter().any(|c| c.id == link.category_id), "{}", link.id);
        }
    }

    #[test]
    fn initial_settings_carry_ai_and_search_config() {
        let settings = initial_settings();
        assert_eq!(settings.ai_config.unwrap().model, DEFAULT_AI_MODEL);
        assert_eq!(settings.search_engines.unwrap().len(), 6);
        assert!(site_settings().ai_config.is_none());
    }
}
