//! Token layouts.

use rule_redactor::domain::{PageContent, Token};

/// Page holding the label/value pair used across the dispatcher tests.
pub fn name_page() -> PageContent {
    PageContent::new(1, 612.0, 792.0).with_tokens(vec![
        Token::new(10.0, 5.0, 30.0, 15.0, "Name:"),
        Token::new(40.0, 5.0, 90.0, 15.0, "John Doe"),
    ])
}

/// Three-column table in `[0,0,100,100]` with headers centred at 10, 50
/// and 90, three body rows and a `TOTAL` row.
pub fn table_tokens() -> Vec<Token> {
    vec![
        Token::new(2.0, 0.0, 18.0, 10.0, "Date"),
        Token::new(40.0, 0.0, 60.0, 10.0, "Amount"),
        Token::new(82.0, 0.0, 98.0, 10.0, "Code"),
        Token::new(2.0, 20.0, 18.0, 30.0, "01/02"),
        Token::new(42.0, 20.0, 58.0, 30.0, "12.00"),
        Token::new(84.0, 20.0, 96.0, 30.0, "A1"),
        Token::new(2.0, 40.0, 18.0, 50.0, "01/03"),
        Token::new(42.0, 40.0, 58.0, 50.0, "7.50"),
        Token::new(84.0, 40.0, 96.0, 50.0, "B2"),
        Token::new(2.0, 60.0, 18.0, 70.0, "TOTAL"),
        Token::new(42.0, 60.0, 58.0, 70.0, "19.50"),
    ]
}

/// One line of tokens at `y`, laid out left to right with 4-unit gaps.
pub fn line(y: f64, height: f64, words: &[&str]) -> Vec<Token> {
    let mut x = 0.0;
    words
        .iter()
        .map(|word| {
            let width = 6.0 * word.chars().count() as f64;
            let token = Token::new(x, y, x + width, y + height, *word);
            x += width + 4.0;
            token
        })
        .collect()
}
