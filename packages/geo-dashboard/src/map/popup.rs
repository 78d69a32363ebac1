use maud::html;

use crate::format::ValueFormatter;
use crate::metric::City;

/// Popup summarising all four metrics of a city.
pub fn popup_html(city: &City, formatter: &dyn ValueFormatter) -> String {
    html!(
        div class="map-popup" {
            strong { (city.name) }
            br;
            "Revenue: " (formatter.currency(city.revenue))
            br;
            "Transactions: " (formatter.number(city.transactions))
            br;
            "Sessions: " (formatter.number(city.sessions))
            br;
            "Conv. Rate: " (formatter.percent(city.conversion_rate))
        }
    )
    .into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::UsdFormatter;

    #[test]
    fn test_popup_lists_all_metrics() {
        let city = City::new("Durban", -29.8587, 31.0218);
        let html = popup_html(&city, &UsdFormatter);

        assert!(html.starts_with(r#"<div class="map-popup"><strong>Durban</strong><br>"#));
        assert!(html.contains("Revenue: $0<br>"));
        assert!(html.contains("Transactions: 0<br>"));
        assert!(html.contains("Sessions: 0<br>"));
        assert!(html.contains("Conv. Rate: 0.0%"));
    }

    #[test]
    fn test_popup_escapes_city_name() {
        let city = City::new("<script>alert(1)</script>", 0.0, 0.0);
        let html = popup_html(&city, &UsdFormatter);

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
