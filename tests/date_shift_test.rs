//! Date detection, shifting and replacement geometry.

use regex::Regex;
use rule_redactor::domain::{
    shift_date_text, DateFormat, DateShiftResolver, FontFamily, FontSpan, HeuristicMeasure,
    PageContent, Rect, TextMeasure, Token,
};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn page_with(tokens: Vec<Token>, spans: Vec<FontSpan>) -> PageContent {
    PageContent::new(1, 612.0, 792.0)
        .with_tokens(tokens)
        .with_spans(spans)
}

fn whole_page() -> Rect {
    Rect::new(0.0, 0.0, 612.0, 792.0)
}

struct OnlyFamily(FontFamily);

impl TextMeasure for OnlyFamily {
    fn measure(&self, text: &str, family: FontFamily, size_pt: f64) -> Option<f64> {
        (family == self.0).then(|| 0.6 * size_pt * text.len() as f64)
    }
}

struct NoMetrics;

impl TextMeasure for NoMetrics {
    fn measure(&self, _text: &str, _family: FontFamily, _size_pt: f64) -> Option<f64> {
        None
    }
}

#[test]
fn test_shift_keeps_format() {
    assert_eq!(shift_date_text("01/15/2024", -7).as_deref(), Some("01/08/2024"));
    assert_eq!(shift_date_text("01/15/24", -7).as_deref(), Some("01/08/24"));
    assert_eq!(shift_date_text("25/12/2023", 7).as_deref(), Some("01/01/2024"));
    assert_eq!(shift_date_text("2024-02-28", 1).as_deref(), Some("2024-02-29"));
    assert_eq!(shift_date_text("13/13/2024", 1), None);
}

#[test]
fn test_precedence_prefers_month_first() {
    let (_, format) = DateFormat::detect("03/04/2005").unwrap();
    assert_eq!(format, DateFormat::MonthDayYear);
    let (_, format) = DateFormat::detect("31/01/2005").unwrap();
    assert_eq!(format, DateFormat::DayMonthYear);
}

#[test]
fn test_replacement_geometry_from_span() {
    let token = Token::new(100.0, 200.0, 160.0, 212.0, "01/15/2024");
    let span = FontSpan {
        bbox: Rect::new(90.0, 195.0, 300.0, 215.0),
        family: FontFamily::Helv,
        size_pt: 12.0,
        color: 0x336699,
    };
    let page = page_with(vec![token], vec![span]);
    let measure = HeuristicMeasure;

    let hits = DateShiftResolver::new(&measure).resolve(&page, &whole_page(), -7);
    assert_eq!(hits.len(), 1);
    let hit = &hits[0];

    assert_eq!(hit.original, "01/15/2024");
    assert_eq!(hit.replacement, "01/08/2024");
    assert_eq!(hit.format, DateFormat::MonthDayYear);

    // 0.5 * 12 * 10 = 60 wide, centred on x=130, plus 0.2 padding
    assert!(approx(hit.rect.x1, 99.8));
    assert!(approx(hit.rect.x2, 160.2));
    let half_h = 0.9 * 12.0 / 2.0 + 0.2;
    assert!(approx(hit.rect.y1, 206.0 - half_h));
    assert!(approx(hit.rect.y2, 206.0 + half_h));

    assert!(approx(hit.insertion_point.0, 100.0));
    assert!(approx(hit.insertion_point.1, 200.0 + 0.76 * 12.0));
    assert!(approx(hit.font.size_pt, 12.0 * 0.85));
    assert_eq!(hit.font.color, 0x336699);
}

#[test]
fn test_partial_match_inside_word_is_rejected() {
    let page = page_with(
        vec![
            Token::new(10.0, 10.0, 80.0, 20.0, "ABC01/02DEF"),
            Token::new(10.0, 30.0, 40.0, 40.0, "01/02"),
        ],
        vec![],
    );
    let measure = HeuristicMeasure;
    let resolver =
        DateShiftResolver::new(&measure).with_pattern(Regex::new(r"\d{2}/\d{2}").unwrap());
    // "01/02" alone equals its token but is not a full date, so nothing parses
    assert!(resolver.resolve(&page, &whole_page(), -7).is_empty());
}

#[test]
fn test_short_match_must_span_token() {
    let page = page_with(
        vec![
            Token::new(10.0, 10.0, 80.0, 20.0, "Ref1/5/24x"),
            Token::new(10.0, 30.0, 40.0, 40.0, "1/5/24"),
        ],
        vec![],
    );
    let measure = HeuristicMeasure;
    let resolver = DateShiftResolver::new(&measure)
        .with_pattern(Regex::new(r"\d{1,2}/\d{1,2}/\d{2}").unwrap());

    let hits = resolver.resolve(&page, &whole_page(), 1);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].original, "1/5/24");
    assert_eq!(hits[0].replacement, "01/06/24");
}

#[test]
fn test_long_date_inside_label_token() {
    let page = page_with(vec![Token::new(0.0, 0.0, 140.0, 10.0, "DOB:01/15/2024")], vec![]);
    let measure = HeuristicMeasure;

    let hits = DateShiftResolver::new(&measure).resolve(&page, &whole_page(), -7);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].original, "01/15/2024");
    assert_eq!(hits[0].replacement, "01/08/2024");
    // 0.5 * 10 * 10 = 50 wide, centred on x=70
    assert!(approx(hits[0].rect.x1, 44.8));
    assert!(approx(hits[0].rect.x2, 95.2));
}

#[test]
fn test_region_overlap_is_enough() {
    let page = page_with(vec![Token::new(90.0, 10.0, 150.0, 22.0, "03/01/2024")], vec![]);
    let measure = HeuristicMeasure;
    let resolver = DateShiftResolver::new(&measure);

    let hits = resolver.resolve(&page, &Rect::new(0.0, 0.0, 100.0, 50.0), -1);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].replacement, "02/29/2024");

    assert!(resolver
        .resolve(&page, &Rect::new(200.0, 0.0, 300.0, 50.0), -1)
        .is_empty());
}

#[test]
fn test_synthetic_font_without_spans() {
    let page = page_with(vec![Token::new(0.0, 0.0, 60.0, 10.0, "12/31/2023")], vec![]);
    let measure = HeuristicMeasure;
    let hits = DateShiftResolver::new(&measure).resolve(&page, &whole_page(), 1);
    assert_eq!(hits[0].replacement, "01/01/2024");
    assert_eq!(hits[0].font.family, FontFamily::Helv);
    assert!(approx(hits[0].font.size_pt, 10.0 * 0.85));
}

#[test]
fn test_font_family_fallback_chain() {
    let page = page_with(vec![Token::new(0.0, 0.0, 60.0, 10.0, "12/31/2023")], vec![]);

    let cour_only = OnlyFamily(FontFamily::Cour);
    let hits = DateShiftResolver::new(&cour_only).resolve(&page, &whole_page(), 1);
    assert_eq!(hits[0].font.family, FontFamily::Cour);

    let none = NoMetrics;
    let hits = DateShiftResolver::new(&none).resolve(&page, &whole_page(), 1);
    let rect = hits[0].rect;
    // half an em per character: 50 wide, centred on x=30, font-tall around y=5
    assert!(approx(rect.x1, 4.8));
    assert!(approx(rect.x2, 55.2));
    assert!(approx(rect.y1, 0.3));
    assert!(approx(rect.y2, 9.7));
    assert_eq!(hits[0].font.family, FontFamily::Helv);
    assert_eq!(hits[0].replacement, "01/01/2024");
}
