//! Markup helpers for display classes and the admin form.

use serde::{Deserialize, Serialize};

use crate::config::FilterType;

/// Simple HTML escaping for text and attribute values.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Static admin configuration form: a title field and a filter type choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminForm {
    pub name: String,
    pub title: String,
    pub filter_type: FilterType,
}

impl AdminForm {
    pub fn new(name: impl Into<String>, title: impl Into<String>, filter_type: FilterType) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            filter_type,
        }
    }

    pub fn title_field(&self) -> String {
        format!(
            r#"<div class="tribe_events_active_filter_type_options"><label for="{name}_title">Title</label><input type="text" id="{name}_title" name="{name}[title]" value="{title}" /></div>"#,
            name = escape_html(&self.name),
            title = escape_html(&self.title),
        )
    }

    pub fn type_field(&self) -> String {
        let name = escape_html(&self.name);
        let mut html = String::from(
            r#"<fieldset class="tribe_events_active_filter_type_options"><legend>Type</legend>"#,
        );
        for option in [FilterType::Select, FilterType::MultiSelect] {
            let checked = if option == self.filter_type {
                r#" checked="checked""#
            } else {
                ""
            };
            html.push_str(&format!(
                r#"<label><input type="radio" name="{name}[type]" value="{value}"{checked} /> {label}</label>"#,
                value = option.as_str(),
                label = option.label(),
            ));
        }
        html.push_str("</fieldset>");
        html
    }

    /// Title field followed by the type field.
    pub fn render(&self) -> String {
        let mut html = self.title_field();
        html.push_str(&self.type_field());
        html
    }
}
