//! Emergency message rendering.

pub const LOCATION_PLACEHOLDER: &str = "[location]";
pub const LOCATION_UNAVAILABLE: &str = "location unavailable";

/// A position supplied by the host. This crate never acquires one itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn map_link(&self) -> String {
        format!("https://maps.google.com/?q={:.6},{:.6}", self.latitude, self.longitude)
    }
}

/// Replaces every `[location]` in `template` with a map link, or with
/// [`LOCATION_UNAVAILABLE`] when there is no fix.
pub fn render_message(template: &str, location: Option<Location>) -> String {
    let replacement = match location {
        Some(location) => location.map_link(),
        None => LOCATION_UNAVAILABLE.to_string(),
    };
    template.replace(LOCATION_PLACEHOLDER, &replacement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DEFAULT_MESSAGE;

    #[test]
    fn default_message_gets_map_link() {
        let message = render_message(DEFAULT_MESSAGE, Some(Location::new(51.5, -0.125)));
        assert!(message.ends_with("https://maps.google.com/?q=51.500000,-0.125000"));
        assert!(!message.contains(LOCATION_PLACEHOLDER));
    }

    #[test]
    fn missing_fix_is_spelled_out() {
        let message = render_message("At [location], then [location]", None);
        assert_eq!(message, "At location unavailable, then location unavailable");
    }

    #[test]
    fn template_without_placeholder_is_unchanged() {
        assert_eq!(render_message("Help", Some(Location::new(0.0, 0.0))), "Help");
    }
}
