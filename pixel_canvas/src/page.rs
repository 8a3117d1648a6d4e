//! The HTML control panel served on `/`.

use std::sync::OnceLock;

use crate::grid::{ColorSelection, GridCell, COLOR_FIELD, GRID_SIZE};

const HEAD: &str = "<!DOCTYPE html>
<html lang='en'>
<head>
<meta charset='UTF-8'>
<meta name='viewport' content='width=device-width, initial-scale=1.0'>
<title>ESP32 Server</title>
<style>
* { box-sizing: border-box; }
.container { display: grid; grid-template-rows: repeat(16, 30px); grid-template-columns: repeat(16, 30px); gap: 0; }
.row { display: contents; }
input[type='checkbox'] { appearance: none; display: grid; margin: 0; }
input[type='checkbox']::before { content: ' '; width: 28px; height: 28px; border: 1px solid black; cursor: pointer; }
input[type='checkbox']:checked::before { background-color: aquamarine; }
</style>
</head>
<body>
<form method='POST' action='/text'>
<label>Text: </label>
<input type='text' name='text'/>
<input type='submit' name='btn-send' value='Write'/>
</form>
<br>
<form method='POST' action='/draw'>
<div class='container'>
";

const TAIL: &str = "<input type='submit' value='Draw'>
</form>
</body>
</html>
";

/// The control page. Rendered on first use, the checkbox names come from
/// [`GridCell::field_name`] so they always match what `/draw` decodes.
pub fn control_page() -> &'static str {
    static PAGE: OnceLock<String> = OnceLock::new();
    PAGE.get_or_init(render)
}

fn render() -> String {
    let mut html = String::with_capacity(16 * 1024);
    html.push_str(HEAD);

    let mut cells = GridCell::all().peekable();
    while cells.peek().is_some() {
        html.push_str("<div class='row'>\n");
        for cell in cells.by_ref().take(usize::from(GRID_SIZE)) {
            html.push_str(&format!(
                "<input type='checkbox' name='{}'>\n",
                cell.field_name()
            ));
        }
        html.push_str("</div>\n");
    }
    html.push_str("</div>\n<br><br>\n");

    html.push_str(&format!(
        "<label for='chooseColor'>Choose a color:</label>\n<select name='{}' id='chooseColor'>\n",
        COLOR_FIELD
    ));
    for color in ColorSelection::ALL {
        html.push_str(&format!(
            "<option value='{}'>{}</option>\n",
            color.code(),
            color.label()
        ));
    }
    html.push_str("</select>\n");
    html.push_str(TAIL);
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkbox_names(html: &str) -> Vec<&str> {
        html.split("<input type='checkbox' name='")
            .skip(1)
            .filter_map(|rest| rest.split('\'').next())
            .collect()
    }

    #[test]
    fn test_page_has_one_checkbox_per_cell() {
        let page = control_page();
        let names = checkbox_names(page);
        let expected: Vec<String> = GridCell::all().map(GridCell::field_name).collect();
        assert_eq!(names, expected);
        assert_eq!(page.matches("<div class='row'>").count(), 16);
    }

    #[test]
    fn test_page_forms_and_colors() {
        let page = control_page();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("action='/text'"));
        assert!(page.contains("action='/draw'"));
        assert!(page.contains("name='text'"));
        assert!(page.contains("<select name='textColor'"));
        for (code, label) in [(0, "Red"), (1, "Green"), (2, "Blue"), (3, "White")] {
            assert!(page.contains(&format!("<option value='{code}'>{label}</option>")));
        }
        assert!(page.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_page_is_cached() {
        assert!(std::ptr::eq(control_page(), control_page()));
    }
}
