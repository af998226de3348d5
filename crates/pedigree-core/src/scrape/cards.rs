//! Selector plumbing for the external pedigree layout.
//!
//! The source site encodes the ancestry tree positionally: two branch rows
//! (father's lineage, mother's lineage), each carrying three generation
//! groups of 1, 2, and 4 ancestor cards. The selectors here are a versioned
//! contract with that specific layout, not a general HTML format.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::models::Sex;

static ROOT_NAME_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1.dog-name").unwrap());
static ROOT_IMAGE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img.dog-photo").unwrap());
static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table.pedigree tr").unwrap());
static GEN_SELS: LazyLock<[Selector; 3]> = LazyLock::new(|| {
    [
        Selector::parse("td.gen-1").unwrap(),
        Selector::parse("td.gen-2").unwrap(),
        Selector::parse("td.gen-3").unwrap(),
    ]
});
static CARD_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.dog-card").unwrap());
static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
static IMG_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());

/// Presentation class the source site puts on male cards. Its absence is
/// read as female, matching the site's own (lossy) convention; see the
/// scraper notes in DESIGN.md.
const MALE_MARKER_CLASS: &str = "male";

/// One scraped ancestor card, before slot assignment.
#[derive(Clone, Debug, PartialEq)]
pub struct AncestorCard {
    pub name: String,
    /// Raw `src` attribute, possibly relative to the source page.
    pub image_src: Option<String>,
    /// Profile link made absolute against the source base when possible.
    pub profile_url: Option<String>,
    pub sex: Sex,
}

/// The three generation card groups of one branch row, in document order.
pub type BranchRow = [Vec<AncestorCard>; 3];

fn clean_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn absolutize(href: &str, base: Option<&Url>) -> Option<String> {
    match Url::parse(href) {
        Ok(url) => Some(url.to_string()),
        Err(_) => base.and_then(|b| b.join(href).ok()).map(|u| u.to_string()),
    }
}

/// The root individual's display name, if the page carries one.
pub fn root_name(doc: &Html) -> Option<String> {
    doc.select(&ROOT_NAME_SEL)
        .map(clean_text)
        .find(|name| !name.is_empty())
}

/// The root individual's image `src`, if present.
pub fn root_image(doc: &Html) -> Option<String> {
    doc.select(&ROOT_IMAGE_SEL)
        .find_map(|img| img.value().attr("src"))
        .map(|src| src.to_string())
}

/// Extract a single card. Cards with no name are dropped, not emitted.
fn extract_card(el: ElementRef<'_>, base: Option<&Url>) -> Option<AncestorCard> {
    let link = el.select(&LINK_SEL).next();
    let name = match link {
        Some(a) => clean_text(a),
        None => clean_text(el),
    };
    if name.is_empty() {
        return None;
    }

    let profile_url = link
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| absolutize(href, base));
    let image_src = el
        .select(&IMG_SEL)
        .find_map(|img| img.value().attr("src"))
        .map(|src| src.to_string());

    // Marker class present => male; absent => female (source-site default).
    let sex = if el.value().classes().any(|c| c == MALE_MARKER_CLASS) {
        Sex::Male
    } else {
        Sex::Female
    };

    Some(AncestorCard {
        name,
        image_src,
        profile_url,
        sex,
    })
}

fn extract_row(row: ElementRef<'_>, base: Option<&Url>) -> Option<BranchRow> {
    let mut groups: BranchRow = [Vec::new(), Vec::new(), Vec::new()];
    let mut is_branch_row = false;
    for (k, gen_sel) in GEN_SELS.iter().enumerate() {
        for container in row.select(gen_sel) {
            is_branch_row = true;
            for card in container.select(&CARD_SEL) {
                if let Some(card) = extract_card(card, base) {
                    groups[k].push(card);
                }
            }
        }
    }
    is_branch_row.then_some(groups)
}

/// All branch rows found in the document, identified by structural shape
/// (rows carrying at least one generation-group container), in document
/// order: father's lineage first, then mother's.
pub fn branch_rows(doc: &Html, base: Option<&Url>) -> Vec<BranchRow> {
    doc.select(&ROW_SEL)
        .filter_map(|row| extract_row(row, base))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
