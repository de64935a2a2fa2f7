use log::debug;
use scraper::{ElementRef, Html, Selector};

const CONTAINER_SELECTOR: &str = "div#transcript";
const SEGMENT_SELECTOR: &str = "span.transcript-segment";

/// Pull the transcript text out of a transcript page
///
/// Returns an empty string when the page has no transcript container,
/// which callers treat as "no data" rather than an error.
pub fn extract_transcript_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let container_selector = Selector::parse(CONTAINER_SELECTOR).unwrap();
    let segment_selector = Selector::parse(SEGMENT_SELECTOR).unwrap();

    let Some(container) = document.select(&container_selector).next() else {
        debug!("No transcript container in page");
        return String::new();
    };

    let segments: Vec<String> = container
        .select(&segment_selector)
        .map(segment_text)
        .collect();
    debug!("Found {} transcript segments", segments.len());

    segments.join(" ")
}

/// Text of one segment with every text node trimmed
fn segment_text(segment: ElementRef) -> String {
    segment
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect()
}
