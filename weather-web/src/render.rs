//! Server-side HTML for the single lookup page.

use std::fmt::Write;

use weather_core::{PageModel, WeatherRecord, WeatherView};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 40rem; margin: 2rem auto; padding: 0 1rem; }
form.lookup { display: flex; gap: .5rem; }
form.lookup input[type=text] { flex: 1; padding: .4rem; }
.card { border: 1px solid #ccc; border-radius: 6px; padding: 1rem; margin: 1rem 0; }
.error { color: #b00020; }
table { width: 100%; border-collapse: collapse; }
th, td { text-align: left; padding: .3rem; border-bottom: 1px solid #eee; }
"#;

/// Render the whole page for one response.
pub fn page(model: &PageModel) -> String {
    let mut html = String::with_capacity(4096);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Weather lookup</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n<h1>Weather lookup</h1>\n");

    html.push_str(
        "<form class=\"lookup\" method=\"post\" action=\"/\">\n\
         <input type=\"text\" name=\"city\" placeholder=\"Enter a city\" required>\n\
         <button type=\"submit\">Get weather</button>\n\
         </form>\n",
    );

    if let Some(error) = &model.error {
        let _ = writeln!(html, "<p class=\"error\">{}</p>", escape(error));
    }

    if let Some(weather) = &model.weather {
        result_card(&mut html, weather);
    }

    history_section(&mut html, &model.history);

    html.push_str("</body>\n</html>\n");
    html
}

fn result_card(html: &mut String, w: &WeatherView) {
    let _ = write!(
        html,
        "<div class=\"card\">\n\
         <h2>{city}, {country}</h2>\n\
         <p>Temperature: {temp} &deg;C</p>\n\
         <p>Wind speed: {wind} km/h</p>\n\
         <p>Condition: {desc} ({cond})</p>\n\
         <p>Time: {time}</p>\n\
         </div>\n",
        city = escape(&w.city),
        country = escape(&w.country),
        temp = w.temperature,
        wind = w.windspeed,
        desc = escape(&w.description),
        cond = escape(w.condition),
        time = escape(&w.time),
    );
}

fn history_section(html: &mut String, history: &[WeatherRecord]) {
    html.push_str("<h2>Recent searches</h2>\n");

    if history.is_empty() {
        html.push_str("<p>No searches yet.</p>\n");
        return;
    }

    html.push_str(
        "<table>\n<tr><th>City</th><th>Temperature</th><th>Description</th><th>Time</th></tr>\n",
    );
    for row in history {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{} &deg;C</td><td>{}</td><td>{}</td></tr>",
            escape(&row.city),
            row.temperature,
            escape(&row.description),
            escape(&row.time),
        );
    }
    html.push_str("</table>\n");

    html.push_str(
        "<form method=\"post\" action=\"/clear\">\n\
         <button type=\"submit\">Clear history</button>\n\
         </form>\n",
    );
}

/// Minimal HTML escaping for text and attribute content.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
