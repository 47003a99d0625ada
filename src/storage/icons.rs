use std::collections::BTreeMap;

use crate::model::Link;

/// Link id to embedded `data:image` icon.
pub type IconMap = BTreeMap<String, String>;

/// Moves embedded-image icons off the link records into a separate map.
/// Plain icon URLs stay on their links.
pub fn split_icons(links: Vec<Link>) -> (Vec<Link>, IconMap) {
    let mut icons = IconMap::new();
    let links = links
        .into_iter()
        .map(|mut link| {
            if link.has_embedded_icon() {
                if let Some(icon) = link.icon.take() {
                    icons.insert(link.id.clone(), icon);
                }
            }
            link
        })
        .collect();
    (links, icons)
}

pub fn merge_icons(links: &mut [Link], icons: &IconMap) {
    for link in links.iter_mut() {
        if let Some(icon) = icons.get(&link.id) {
            link.icon = Some(icon.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(id: &str, icon: Option<&str>) -> Link {
        Link {
            id: id.to_string(),
            title: id.to_string(),
            url: format!("https://{}.example.com", id),
            icon: icon.map(str::to_string),
            description: None,
            category_id: "common".to_string(),
            created_at: 0,
            pinned: None,
            pinned_order: None,
        }
    }

    #[test]
    fn split_moves_only_embedded_icons() {
        let links = vec![
            link("a", Some("data:image/png;base64,AAAA")),
            link("b", Some("https://b.example.com/favicon.ico")),
            link("c", None),
        ];
        let (stripped, icons) = split_icons(links);

        assert_eq!(icons.len(), 1);
        assert_eq!(icons["a"], "data:image/png;base64,AAAA");
        assert_eq!(stripped[0].icon, None);
        assert_eq!(stripped[1].icon.as_deref(), Some("https://b.example.com/favicon.ico"));
        assert_eq!(stripped[2].icon, None);
    }

    #[test]
    fn merge_restores_split_links() {
        let original = vec![
            link("a", Some("data:image/svg+xml;base64,PHN2Zy8+")),
            link("b", Some("https://b.example.com/favicon.ico")),
            link("c", None),
        ];
        let (mut stripped, icons) = split_icons(original.clone());
        merge_icons(&mut stripped, &icons);
        assert_eq!(stripped, original);
    }

    #[test]
    fn merge_ignores_icons_for_unknown_links() {
        let mut links = vec![link("a", None)];
        let mut icons = IconMap::new();
        icons.insert("gone".into(), "data:image/png;base64,AAAA".into());
        merge_icons(&mut links, &icons);
        assert_eq!(links[0].icon, None);
    }
}
