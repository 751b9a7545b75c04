use crate::errors::ConfigError;
use crate::parsers::text;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Compiles a CSS selector, reporting failures as configuration errors
pub fn compile_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// A fetched page: the URL it was loaded from and its parsed document
pub struct Page {
    url: Url,
    document: Html,
}

impl Page {
    /// Parses page source fetched from `url`
    pub fn from_html(url: Url, html: &str) -> Self {
        Self {
            url,
            document: Html::parse_document(html),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns every element matching the selector, in document order
    pub fn select<'a>(&'a self, selector: &Selector) -> Vec<Element<'a>> {
        let elements: Vec<Element<'a>> = self.document.select(selector).map(Element).collect();
        ::log::trace!("Selector matched {} elements on {}", elements.len(), self.url);
        elements
    }
}

/// Handle to one element of a [`Page`]
#[derive(Clone, Copy)]
pub struct Element<'a>(ElementRef<'a>);

impl<'a> Element<'a> {
    /// Inner text with one line per child element
    ///
    /// Each child (a table cell, a list item's span) becomes one line holding
    /// all of its text, so inline markup inside a cell stays in that cell.
    /// Empty children are skipped. A block without non-empty element children
    /// falls back to one line per text node.
    pub fn text(&self) -> String {
        let cells: Vec<String> = self
            .0
            .children()
            .filter_map(ElementRef::wrap)
            .map(|child| Element(child).inline_text())
            .filter(|cell| !cell.is_empty())
            .collect();

        if !cells.is_empty() {
            return cells.join("\n");
        }

        self.0
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// All text of the element on one line, as a reader would see it inline
    pub fn inline_text(&self) -> String {
        text::normalize_whitespace_in_segment(&self.0.text().collect::<String>())
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.0.value().attr(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(html: &str) -> Page {
        Page::from_html(Url::parse("https://example.com/list").unwrap(), html)
    }

    #[test]
    fn test_select_and_text() {
        let page = page(
            "<table><tr><td>Metallica</td><td>One</td><td> 9.5 </td></tr>\
             <tr><td>Tool</td><td>Schism</td><td></td></tr></table>",
        );
        let rows = page.select(&compile_selector("tr").unwrap());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text(), "Metallica\nOne\n9.5");
        assert_eq!(rows[1].text(), "Tool\nSchism");
    }

    #[test]
    fn test_inline_markup_stays_in_its_cell() {
        let page = page(
            "<table><tr>\n  <td>Tom <b>Petty</b></td>\n  <td><a href=\"/t/1\">Free</a> Fallin</td>\n  \
             <td>120,000</td>\n</tr></table>",
        );
        let rows = page.select(&compile_selector("tr").unwrap());
        assert_eq!(rows[0].text(), "Tom Petty\nFree Fallin\n120,000");
    }

    #[test]
    fn test_text_nodes_without_child_elements() {
        let page = page("<p>Metallica<br>One</p><pre>Tool\nSchism\n88,000</pre>");
        let p = page.select(&compile_selector("p").unwrap());
        assert_eq!(p[0].text(), "Metallica\nOne");
        let pre = page.select(&compile_selector("pre").unwrap());
        assert_eq!(pre[0].text(), "Tool\nSchism\n88,000");
    }

    #[test]
    fn test_inline_text() {
        let page = page(r#"<a href="/x"><b>Lee</b>,   Roy</a>"#);
        let links = page.select(&compile_selector("a").unwrap());
        assert_eq!(links[0].inline_text(), "Lee, Roy");
    }

    #[test]
    fn test_attribute() {
        let page = page(r#"<a href="/nfl/team/roster/_/name/buf" title="Bills">Bills</a>"#);
        let links = page.select(&compile_selector("a").unwrap());
        assert_eq!(links[0].attribute("href"), Some("/nfl/team/roster/_/name/buf"));
        assert_eq!(links[0].attribute("title"), Some("Bills"));
        assert_eq!(links[0].attribute("src"), None);
    }

    #[test]
    fn test_invalid_selector() {
        assert!(matches!(
            compile_selector("tr[[["),
            Err(ConfigError::Selector { .. })
        ));
    }
}
