use scraper::node::Element;

/// The handful of inline declarations the static host understands.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InlineStyle {
    pub display: Option<String>,
    pub visibility: Option<String>,
    pub opacity: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl InlineStyle {
    pub fn of(element: &Element) -> Self {
        let mut style = element.attr("style").map(Self::parse).unwrap_or_default();
        if element.attr("hidden").is_some() && style.display.is_none() {
            style.display = Some("none".to_string());
        }
        style
    }

    pub fn parse(raw: &str) -> Self {
        let mut style = Self::default();
        for declaration in raw.split(';') {
            let Some((property, value)) = declaration.split_once(':') else {
                continue;
            };
            let property = property.trim().to_ascii_lowercase();
            let value = value.trim().trim_end_matches("!important").trim().to_ascii_lowercase();
            match property.as_str() {
                "display" => style.display = Some(value),
                "visibility" => style.visibility = Some(value),
                "opacity" => style.opacity = Some(value),
                "width" => style.width = parse_length(&value),
                "height" => style.height = parse_length(&value),
                _ => {}
            }
        }
        style
    }

    pub fn hides_subtree(&self) -> bool {
        self.display.as_deref() == Some("none")
    }
}

// Only absolute pixel lengths; anything relative is left to the default box.
fn parse_length(value: &str) -> Option<f64> {
    value.strip_suffix("px").unwrap_or(value).trim().parse().ok()
}
