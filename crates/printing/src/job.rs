use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque identifier for a print job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrintJobId(u64);

impl PrintJobId {
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for PrintJobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PrintJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "print-job-{}", self.0)
    }
}

/// How page content is mapped onto the paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalingMode {
    /// Scale the content to fill the paper.
    Fit,
    /// Print at the document's native size.
    Actual,
}

impl ScalingMode {
    /// Parses a scaling token, ignoring ASCII case and surrounding whitespace.
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.eq_ignore_ascii_case("fit") {
            Some(ScalingMode::Fit)
        } else if token.eq_ignore_ascii_case("actual") {
            Some(ScalingMode::Actual)
        } else {
            None
        }
    }

    pub const fn token(self) -> &'static str {
        match self {
            ScalingMode::Fit => "fit",
            ScalingMode::Actual => "actual",
        }
    }
}

impl fmt::Display for ScalingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Paper dimensions expressed in points (1/72").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaperSize {
    pub width_pt: f64,
    pub height_pt: f64,
}

impl PaperSize {
    pub const fn new(width_pt: f64, height_pt: f64) -> Self {
        Self {
            width_pt,
            height_pt,
        }
    }

    pub fn from_mm(width_mm: f64, height_mm: f64) -> Self {
        const MM_PER_INCH: f64 = 25.4;
        Self::new(
            width_mm / MM_PER_INCH * 72.0,
            height_mm / MM_PER_INCH * 72.0,
        )
    }

    /// Returns the size with width and height exchanged.
    pub const fn rotated(self) -> Self {
        Self::new(self.height_pt, self.width_pt)
    }

    pub fn is_valid(&self) -> bool {
        self.width_pt.is_finite()
            && self.height_pt.is_finite()
            && self.width_pt > 0.0
            && self.height_pt > 0.0
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}x{:.2}pt", self.width_pt, self.height_pt)
    }
}

/// Supported paper identifiers, including the `pdf` sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PaperId {
    /// Use the page size of each document's first page.
    #[default]
    Pdf,
    A0,
    A1,
    A2,
    A3,
    A4,
    A5,
    A6,
    A7,
    A8,
    A9,
    A10,
    B0,
    B1,
    B2,
    B3,
    B4,
    B5,
    B6,
    B7,
    B8,
    B9,
    B10,
    C0,
    C1,
    C2,
    C3,
    C4,
    C5,
    C6,
    C7,
    C8,
    C9,
    C10,
    Letter,
    Legal,
    Tabloid,
    Ledger,
    Executive,
    Statement,
    Photo4x6,
    Photo5x7,
    Photo8x10,
}

struct PaperEntry {
    id: PaperId,
    token: &'static str,
    width_mm: f64,
    height_mm: f64,
}

const fn entry(id: PaperId, token: &'static str, width_mm: f64, height_mm: f64) -> PaperEntry {
    PaperEntry {
        id,
        token,
        width_mm,
        height_mm,
    }
}

// Portrait dimensions in millimetres. Ledger is tabloid turned landscape.
static PAPER_TABLE: [PaperEntry; 42] = [
    entry(PaperId::A0, "a0", 841.0, 1189.0),
    entry(PaperId::A1, "a1", 594.0, 841.0),
    entry(PaperId::A2, "a2", 420.0, 594.0),
    entry(PaperId::A3, "a3", 297.0, 420.0),
    entry(PaperId::A4, "a4", 210.0, 297.0),
    entry(PaperId::A5, "a5", 148.0, 210.0),
    entry(PaperId::A6, "a6", 105.0, 148.0),
    entry(PaperId::A7, "a7", 74.0, 105.0),
    entry(PaperId::A8, "a8", 52.0, 74.0),
    entry(PaperId::A9, "a9", 37.0, 52.0),
    entry(PaperId::A10, "a10", 26.0, 37.0),
    entry(PaperId::B0, "b0", 1000.0, 1414.0),
    entry(PaperId::B1, "b1", 707.0, 1000.0),
    entry(PaperId::B2, "b2", 500.0, 707.0),
    entry(PaperId::B3, "b3", 353.0, 500.0),
    entry(PaperId::B4, "b4", 250.0, 353.0),
    entry(PaperId::B5, "b5", 176.0, 250.0),
    entry(PaperId::B6, "b6", 125.0, 176.0),
    entry(PaperId::B7, "b7", 88.0, 125.0),
    entry(PaperId::B8, "b8", 62.0, 88.0),
    entry(PaperId::B9, "b9", 44.0, 62.0),
    entry(PaperId::B10, "b10", 31.0, 44.0),
    entry(PaperId::C0, "c0", 917.0, 1297.0),
    entry(PaperId::C1, "c1", 648.0, 917.0),
    entry(PaperId::C2, "c2", 458.0, 648.0),
    entry(PaperId::C3, "c3", 324.0, 458.0),
    entry(PaperId::C4, "c4", 229.0, 324.0),
    entry(PaperId::C5, "c5", 162.0, 229.0),
    entry(PaperId::C6, "c6", 114.0, 162.0),
    entry(PaperId::C7, "c7", 81.0, 114.0),
    entry(PaperId::C8, "c8", 57.0, 81.0),
    entry(PaperId::C9, "c9", 40.0, 57.0),
    entry(PaperId::C10, "c10", 28.0, 40.0),
    entry(PaperId::Letter, "letter", 215.9, 279.4),
    entry(PaperId::Legal, "legal", 215.9, 355.6),
    entry(PaperId::Tabloid, "tabloid", 279.4, 431.8),
    entry(PaperId::Ledger, "ledger", 431.8, 279.4),
    entry(PaperId::Executive, "executive", 184.15, 266.7),
    entry(PaperId::Statement, "statement", 139.7, 215.9),
    entry(PaperId::Photo4x6, "photo4x6", 101.6, 152.4),
    entry(PaperId::Photo5x7, "photo5x7", 127.0, 177.8),
    entry(PaperId::Photo8x10, "photo8x10", 203.2, 254.0),
];

impl PaperId {
    pub const DOCUMENT_TOKEN: &'static str = "pdf";

    /// Looks up a paper token, ignoring ASCII case and surrounding whitespace.
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.eq_ignore_ascii_case(Self::DOCUMENT_TOKEN) {
            return Some(PaperId::Pdf);
        }
        PAPER_TABLE
            .iter()
            .find(|entry| entry.token.eq_ignore_ascii_case(token))
            .map(|entry| entry.id)
    }

    pub fn token(self) -> &'static str {
        self.entry()
            .map(|entry| entry.token)
            .unwrap_or(Self::DOCUMENT_TOKEN)
    }

    /// Fixed dimensions for this paper, or `None` for the `pdf` sentinel.
    pub fn size(self) -> Option<PaperSize> {
        self.entry()
            .map(|entry| PaperSize::from_mm(entry.width_mm, entry.height_mm))
    }

    /// All tokens accepted by [`PaperId::from_token`], in table order.
    pub fn tokens() -> impl Iterator<Item = &'static str> {
        std::iter::once(Self::DOCUMENT_TOKEN).chain(PAPER_TABLE.iter().map(|entry| entry.token))
    }

    fn entry(self) -> Option<&'static PaperEntry> {
        PAPER_TABLE.iter().find(|entry| entry.id == self)
    }
}

impl fmt::Display for PaperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Options supplied when requesting a print job for a single document.
///
/// Background disposition and long-edge duplex apply to every job and are
/// left to the platform adapter.
#[derive(Debug, Clone)]
pub struct PrintJobOptions {
    pub job_id: PrintJobId,
    /// Spooler queue name.
    pub printer: String,
    pub paper: PaperSize,
    pub scaling: ScalingMode,
}

impl PrintJobOptions {
    pub fn new(printer: impl Into<String>, paper: PaperSize, scaling: ScalingMode) -> Self {
        Self {
            job_id: PrintJobId::new(),
            printer: printer.into(),
            paper,
            scaling,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 0.5,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn common_sizes_match_their_point_dimensions() {
        let a4 = PaperId::A4.size().unwrap();
        assert_close(a4.width_pt, 595.3);
        assert_close(a4.height_pt, 841.9);

        let letter = PaperId::Letter.size().unwrap();
        assert_close(letter.width_pt, 612.0);
        assert_close(letter.height_pt, 792.0);

        let ledger = PaperId::Ledger.size().unwrap();
        assert_close(ledger.width_pt, 1224.0);
        assert_close(ledger.height_pt, 792.0);
    }

    #[test]
    fn tokens_are_case_insensitive() {
        assert_eq!(PaperId::from_token("A4"), Some(PaperId::A4));
        assert_eq!(PaperId::from_token("letter"), Some(PaperId::Letter));
        assert_eq!(PaperId::from_token("LeGaL"), Some(PaperId::Legal));
        assert_eq!(PaperId::from_token("PDF"), Some(PaperId::Pdf));
        assert_eq!(PaperId::from_token(" b10 "), Some(PaperId::B10));
        assert_eq!(PaperId::from_token("a11"), None);
        assert_eq!(PaperId::from_token(""), None);
    }

    #[test]
    fn every_fixed_token_round_trips_and_has_positive_size() {
        for token in PaperId::tokens() {
            let id = PaperId::from_token(token).unwrap();
            assert_eq!(id.token(), token);
            match id.size() {
                Some(size) => assert!(size.is_valid(), "{token} has invalid size"),
                None => assert_eq!(id, PaperId::Pdf),
            }
        }
        assert_eq!(PaperId::tokens().count(), 43);
    }

    #[test]
    fn iso_series_shrink_monotonically() {
        for series in ["a", "b", "c"] {
            let mut previous = f64::INFINITY;
            for index in 0..=10 {
                let size = PaperId::from_token(&format!("{series}{index}"))
                    .and_then(PaperId::size)
                    .unwrap();
                assert!(size.height_pt < previous);
                previous = size.height_pt;
            }
        }
    }

    #[test]
    fn scaling_tokens() {
        assert_eq!(ScalingMode::from_token("FIT"), Some(ScalingMode::Fit));
        assert_eq!(ScalingMode::from_token("Actual"), Some(ScalingMode::Actual));
        assert_eq!(ScalingMode::from_token("shrink"), None);
    }

    #[test]
    fn each_job_gets_a_fresh_id() {
        let options = PrintJobOptions::new("Office", PaperSize::new(612.0, 792.0), ScalingMode::Fit);
        assert_ne!(options.job_id, PrintJobOptions::new("Office", options.paper, ScalingMode::Fit).job_id);
    }
}
