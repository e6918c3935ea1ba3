use crate::core::settings::ScrapeSettings;
use crate::refresher::RefreshError;
use anyhow::Result;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use regex::Regex;
use scraper::{Html, Selector};

/// Fields pulled out of one ticket page. The QR image is already decoded
/// from its data URI; the validity window and metadata are optional on the
/// page and resolved by the refresher.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketExtract {
    pub ticket_number: String,
    pub qr_image: Vec<u8>,
    pub valid_from: Option<String>,
    pub valid_until: Option<String>,
    pub region: Option<String>,
    pub ticket_class: Option<String>,
}

pub trait TicketExtractor: Send + Sync {
    fn extract(&self, html: &str) -> Result<TicketExtract, RefreshError>;
}

/// Locates the ticket fields by fixed element ids, the structure the
/// mirrored page has used so far. The ids come from settings so a page
/// change needs a config edit, not a rebuild.
pub struct ElementIdExtractor {
    ticket_number: Selector,
    qr_image: Selector,
    valid_from: Selector,
    valid_until: Selector,
    region: Selector,
    ticket_class: Selector,
    data_uri_prefix: Regex,
}

impl ElementIdExtractor {
    pub fn new(scrape: &ScrapeSettings) -> Result<Self> {
        Ok(Self {
            ticket_number: id_selector(&scrape.ticket_number_id)?,
            qr_image: id_selector(&scrape.qr_image_id)?,
            valid_from: id_selector(&scrape.valid_from_id)?,
            valid_until: id_selector(&scrape.valid_until_id)?,
            region: id_selector(&scrape.region_id)?,
            ticket_class: id_selector(&scrape.ticket_class_id)?,
            data_uri_prefix: Regex::new(r"^data:image/[^;]+;base64,")
                .map_err(|e| anyhow::anyhow!("Invalid data URI pattern: {e}"))?,
        })
    }

    fn element_text(document: &Html, selector: &Selector) -> Option<String> {
        document
            .select(selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
    }
}

impl TicketExtractor for ElementIdExtractor {
    fn extract(&self, html: &str) -> Result<TicketExtract, RefreshError> {
        let document = Html::parse_document(html);

        let ticket_number = Self::element_text(&document, &self.ticket_number)
            .ok_or_else(|| RefreshError::Parse("ticket number element not found".to_string()))?;

        let qr_src = document
            .select(&self.qr_image)
            .next()
            .and_then(|el| el.value().attr("src"))
            .ok_or_else(|| {
                RefreshError::Parse("QR image element or src attribute not found".to_string())
            })?;

        let payload = self
            .data_uri_prefix
            .find(qr_src)
            .map(|m| &qr_src[m.end()..])
            .ok_or_else(|| {
                RefreshError::Parse("QR image src is not a base64 image data URI".to_string())
            })?;

        let qr_image = BASE64.decode(payload)?;

        Ok(TicketExtract {
            ticket_number,
            qr_image,
            valid_from: Self::element_text(&document, &self.valid_from),
            valid_until: Self::element_text(&document, &self.valid_until),
            region: Self::element_text(&document, &self.region),
            ticket_class: Self::element_text(&document, &self.ticket_class),
        })
    }
}

fn id_selector(id: &str) -> Result<Selector> {
    // Selector::parse accepts "#bad id" as a descendant selector, so ids are
    // restricted to bare identifiers here
    let mut chars = id.chars();
    let head_ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    let tail_ok = chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !head_ok || !tail_ok {
        anyhow::bail!("Invalid element id {id:?}: expected a bare CSS identifier");
    }

    let css = format!("#{id}");
    Selector::parse(&css).map_err(|e| anyhow::anyhow!("Invalid element id {id:?}: {e}"))
}
