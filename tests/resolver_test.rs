//! Geometry, search and the table/column/generic resolvers.

use rule_redactor::domain::generic::{ALL_TEXT_INSET, LABELLED_INSET};
use rule_redactor::domain::{
    find_text_coordinates, point_in_rect, rect_contains, ColumnByNameResolver, GenericSweep,
    PatternType, Rect, RuleKind, TableColumnResolver, TableLayout, Token,
};

mod common;
use common::*;

mod geometry {
    use super::*;

    #[test]
    fn test_mutual_containment_means_equal() {
        let a = Rect::new(10.0, 20.0, 0.0, 5.0);
        let b = Rect::new(0.0, 5.0, 10.0, 20.0);
        assert!(rect_contains(&a, &b) && rect_contains(&b, &a));
        assert_eq!(a.normalized(), b.normalized());

        let c = Rect::new(0.0, 5.0, 10.0, 19.0);
        assert!(rect_contains(&a, &c));
        assert!(!rect_contains(&c, &a));
    }

    #[test]
    fn test_point_in_rect_inclusive_on_every_edge() {
        for (px, py) in [(0.0, 5.0), (10.0, 5.0), (0.0, 0.0), (10.0, 10.0), (5.0, 10.0)] {
            assert!(point_in_rect(10.0, 10.0, 0.0, 0.0, px, py), "({}, {})", px, py);
        }
        assert!(!point_in_rect(0.0, 0.0, 10.0, 10.0, 10.01, 5.0));
    }

    #[test]
    fn test_degenerate_rect_is_contained() {
        let outer = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect_contains(&outer, &Rect::new(3.0, 3.0, 3.0, 8.0)));
    }
}

mod search {
    use super::*;

    #[test]
    fn test_first_word_fallback() {
        let tokens = line(0.0, 10.0, &["Account", "Holder:", "Smith"]);
        let region = Rect::new(0.0, 0.0, 200.0, 20.0);
        let hit = find_text_coordinates(&tokens, "account holder", &region).unwrap();
        assert_eq!(hit, tokens[0].bbox);
    }

    #[test]
    fn test_candidates_need_an_edge_inside_the_region() {
        let tokens = vec![Token::new(150.0, 50.0, 180.0, 60.0, "Name")];
        assert!(find_text_coordinates(&tokens, "Name", &Rect::new(0.0, 0.0, 100.0, 20.0)).is_none());
        assert!(find_text_coordinates(&tokens, "Name", &Rect::new(170.0, 55.0, 300.0, 100.0)).is_some());
    }
}

mod table {
    use super::*;

    fn region() -> Rect {
        Rect::new(0.0, 0.0, 100.0, 100.0)
    }

    #[test]
    fn test_middle_column_bounds() {
        let tokens = table_tokens();
        let layout = TableLayout::detect(&tokens, &region()).unwrap();
        assert_eq!(layout.columns.len(), 3);

        let amount = layout.column("amount").unwrap();
        assert!((amount.left - 30.0).abs() < 1e-9);
        assert!((amount.right - 70.0).abs() < 1e-9);
        assert_eq!(layout.columns[0].left, 0.0);
        assert_eq!(layout.columns[2].right, 100.0);
    }

    #[test]
    fn test_rows_stop_before_total() {
        let targets = TableColumnResolver::new().resolve(&table_tokens(), &region(), "Amount");
        assert_eq!(
            targets,
            vec![
                Rect::new(40.0, 19.0, 60.0, 31.0),
                Rect::new(40.0, 39.0, 60.0, 51.0),
            ]
        );
        assert!(targets.iter().all(|r| r.center_y() < 60.0));
    }

    #[test]
    fn test_total_header_stops_every_row() {
        let tokens = vec![
            Token::new(2.0, 0.0, 18.0, 10.0, "Item"),
            Token::new(40.0, 0.0, 60.0, 10.0, "Total"),
            Token::new(2.0, 20.0, 18.0, 30.0, "Pens"),
            Token::new(42.0, 20.0, 58.0, 30.0, "4.00"),
            Token::new(2.0, 40.0, 18.0, 50.0, "Ink"),
            Token::new(42.0, 40.0, 58.0, 50.0, "9.00"),
        ];
        let layout = TableLayout::detect(&tokens, &region()).unwrap();
        assert_eq!(layout.stop_row("TOTAL"), Some(0.0));

        let resolver = TableColumnResolver::new();
        assert!(resolver.resolve(&tokens, &region(), "Item").is_empty());
        assert!(resolver.resolve(&tokens, &region(), "Total").is_empty());

        let unstopped = TableColumnResolver::new()
            .with_stop_marker(None)
            .resolve(&tokens, &region(), "Item");
        assert_eq!(unstopped.len(), 2);
    }

    #[test]
    fn test_left_margin_clipped_at_header_edge() {
        let mut tokens = table_tokens();
        tokens[1] = Token::new(31.0, 0.0, 69.0, 10.0, "Amount");
        let layout = TableLayout::detect(&tokens, &region()).unwrap();
        let amount = layout.column("amount").unwrap();
        assert!((amount.left - 30.0).abs() < 1e-9);

        // 15% of 40 would reach 24; the header edge at 31 holds it at 28
        let (left, right) = layout.expanded(amount);
        assert!((left - 28.0).abs() < 1e-9, "left = {}", left);
        assert!((right - 74.0).abs() < 1e-9, "right = {}", right);
    }

    #[test]
    fn test_without_stop_marker_every_row_is_kept() {
        let targets = TableColumnResolver::new()
            .with_stop_marker(None)
            .resolve(&table_tokens(), &region(), "Amount");
        assert_eq!(targets.len(), 3);
    }

    #[test]
    fn test_tokens_outside_region_are_ignored() {
        let mut tokens = table_tokens();
        tokens.push(Token::new(42.0, 95.0, 58.0, 105.0, "99.99"));
        let targets = TableColumnResolver::new()
            .with_stop_marker(None)
            .resolve(&tokens, &region(), "Amount");
        assert_eq!(targets.len(), 3);
    }

    #[test]
    fn test_unknown_label_and_empty_region() {
        let resolver = TableColumnResolver::new();
        assert!(resolver.resolve(&table_tokens(), &region(), "Balance").is_empty());
        assert!(resolver
            .resolve(&table_tokens(), &Rect::new(200.0, 200.0, 300.0, 300.0), "Amount")
            .is_empty());
    }

    #[test]
    fn test_single_header_spans_region() {
        let tokens = vec![
            Token::new(40.0, 0.0, 60.0, 10.0, "Amount"),
            Token::new(5.0, 30.0, 20.0, 40.0, "far-left"),
            Token::new(80.0, 30.0, 95.0, 40.0, "far-right"),
        ];
        let layout = TableLayout::detect(&tokens, &region()).unwrap();
        assert_eq!((layout.columns[0].left, layout.columns[0].right), (0.0, 100.0));

        let targets = TableColumnResolver::new().resolve(&tokens, &region(), "amount");
        // both body tokens share the row band at y=35
        assert_eq!(targets, vec![Rect::new(3.0, 29.0, 97.0, 41.0)]);
    }

    #[test]
    fn test_same_row_jitter_is_merged() {
        let tokens = vec![
            Token::new(10.0, 0.0, 90.0, 10.0, "Description"),
            Token::new(10.0, 20.0, 40.0, 30.0, "Office"),
            Token::new(45.0, 21.0, 80.0, 31.0, "chairs"),
        ];
        let targets = TableColumnResolver::new().resolve(&tokens, &region(), "description");
        assert_eq!(targets, vec![Rect::new(8.0, 19.0, 82.0, 32.0)]);
    }
}

mod column_by_name {
    use super::*;

    #[test]
    fn test_tokens_below_topmost_header() {
        let tokens = vec![
            Token::new(100.0, 10.0, 140.0, 20.0, "Member"),
            Token::new(100.0, 300.0, 140.0, 310.0, "Member"),
            Token::new(92.0, 30.0, 130.0, 40.0, "A-1001"),
            Token::new(135.0, 50.0, 170.0, 60.0, "A-1002"),
            Token::new(200.0, 30.0, 240.0, 40.0, "elsewhere"),
            Token::new(0.0, 30.0, 50.0, 40.0, "label"),
        ];
        let targets = ColumnByNameResolver::new().resolve(&tokens, "member");
        let xs: Vec<f64> = targets.iter().map(|r| r.x1).collect();
        assert_eq!(xs, vec![100.0, 92.0, 135.0]);
    }

    #[test]
    fn test_missing_header() {
        assert!(ColumnByNameResolver::new().resolve(&table_tokens(), "Balance").is_empty());
    }
}

mod generic {
    use super::*;

    fn layout() -> Vec<Token> {
        vec![
            Token::new(1.0, 5.0, 30.0, 15.0, "Name:"),
            Token::new(41.0, 5.0, 90.0, 15.0, "John"),
            Token::new(3.0, 25.0, 30.0, 35.0, "Ref"),
        ]
    }

    #[test]
    fn test_inset_depends_on_kind() {
        assert_eq!(ALL_TEXT_INSET, 2.0);
        assert_eq!(LABELLED_INSET, 40.0);
        let region = Rect::new(0.0, 0.0, 100.0, 40.0);

        let all = GenericSweep::new(region, &RuleKind::AllText).resolve(&layout());
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].x1, 41.0);
        assert_eq!(all[1].x1, 3.0);

        let labelled = GenericSweep::new(region, &RuleKind::HaveValue).resolve(&layout());
        assert_eq!(labelled, vec![Rect::new(41.0, 5.0, 90.0, 15.0)]);
    }

    #[test]
    fn test_full_line_anchor_limits_rows() {
        let region = Rect::new(0.0, 0.0, 100.0, 40.0);
        let sweep = GenericSweep::new(region, &RuleKind::AllText)
            .with_search(Some("ref"))
            .with_pattern(PatternType::FullLine);
        assert_eq!(sweep.resolve(&layout()), vec![Rect::new(3.0, 25.0, 30.0, 35.0)]);
    }

    #[test]
    fn test_missing_anchor_yields_nothing() {
        let sweep = GenericSweep::new(Rect::new(0.0, 0.0, 100.0, 40.0), &RuleKind::AllText)
            .with_search(Some("Address"));
        assert!(sweep.resolve(&layout()).is_empty());
    }
}
