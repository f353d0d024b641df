//! Pairing behavior on small hand-written documents

use mismo_compare::{
    differences, load_str, locate, pair, ElementTree, MatchRecord, MatchTable, NodeRef, Verdict,
    EXACT_SCORE,
};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn party(first: &str, last: &str) -> String {
    format!(
        "<PARTY><ROLE>borrower</ROLE><NAME><FIRST>{first}</FIRST><LAST>{last}</LAST></NAME></PARTY>"
    )
}

fn deal(parties: &[(&str, &str)]) -> Result<ElementTree, mismo_compare::Error> {
    let body: String = parties.iter().map(|(f, l)| party(f, l)).collect();
    load_str(&format!("<DEAL><PARTIES>{body}</PARTIES></DEAL>"))
}

fn parties(tree: &ElementTree) -> Vec<NodeRef<'_>> {
    locate(tree, "PARTY").unwrap_or_default()
}

fn xpath(i: usize, of: usize) -> String {
    if of == 1 {
        "/DEAL/PARTIES/PARTY".to_string()
    } else {
        format!("/DEAL/PARTIES/PARTY[{i}]")
    }
}

fn record<'t, 'a>(table: &'t MatchTable<'a>, path: &str) -> Result<&'t MatchRecord<'a>, String> {
    table.get(path).ok_or_else(|| format!("no record for {path}"))
}

fn closest_first_name(record: &MatchRecord<'_>) -> Option<String> {
    differences(record)
        .into_iter()
        .find(|d| d.field.as_deref() == Some("FIRST"))
        .and_then(|d| d.basis)
}

#[test]
fn test_identical_singletons_match_exactly() -> TestResult {
    let primary = deal(&[("John", "Smith")])?;
    let basis = deal(&[("John", "Smith")])?;
    let table = pair(&parties(&primary), &parties(&basis));

    let rec = record(&table, &xpath(0, 1))?;
    assert!(rec.is_exact());
    assert!(rec.closest_candidate().is_none());
    assert_eq!(rec.closest_score(), EXACT_SCORE);
    // NAME|FIRST and NAME|LAST
    assert_eq!(rec.total_comparable(), 2);
    Ok(())
}

#[test]
fn test_one_differing_leaf_value() -> TestResult {
    let primary = deal(&[("John", "Smith")])?;
    let basis = deal(&[("Jon", "Smith")])?;
    let table = pair(&parties(&primary), &parties(&basis));

    let rec = record(&table, &xpath(0, 1))?;
    assert!(!rec.is_exact());
    let total = i64::try_from(rec.total_comparable())?;
    assert_eq!(rec.closest_score(), total - 1);
    assert_eq!(rec.differences_count(), Some(1));
    Ok(())
}

fn party_with_role(role_type: &str) -> Result<ElementTree, mismo_compare::Error> {
    load_str(&format!(
        "<DEAL><PARTIES><PARTY><ROLE><ROLE_TYPE>{role_type}</ROLE_TYPE>\
         <BORROWER><BIRTH_DATE>1970-01-01</BIRTH_DATE></BORROWER></ROLE></PARTY></PARTIES></DEAL>"
    ))
}

#[test]
fn test_differing_field_on_intermediate_element() -> TestResult {
    let primary = party_with_role("Borrower")?;
    let basis = party_with_role("Lender")?;
    let table = pair(&parties(&primary), &parties(&basis));

    let rec = record(&table, &xpath(0, 1))?;
    assert!(!rec.is_exact());
    assert_eq!(rec.closest_score(), 1);
    // ROLE|ROLE_TYPE and BORROWER|BIRTH_DATE
    assert_eq!(rec.total_comparable(), 2);
    assert_eq!(rec.differences_count(), Some(1));

    let changed: Vec<_> = differences(rec).into_iter().filter(|d| d.differs()).collect();
    assert_eq!(changed.len(), 1);
    let row = changed.first().ok_or("no differing row")?;
    assert_eq!(row.path, "DEAL/PARTIES/PARTY/ROLE");
    assert_eq!(row.field.as_deref(), Some("ROLE_TYPE"));
    assert_eq!(row.primary.as_deref(), Some("Borrower"));
    assert_eq!(row.basis.as_deref(), Some("Lender"));
    Ok(())
}

#[test]
fn test_intermediate_fields_equal_is_exact() -> TestResult {
    let primary = party_with_role("Borrower")?;
    let basis = party_with_role("Borrower")?;
    let table = pair(&parties(&primary), &parties(&basis));

    assert!(record(&table, &xpath(0, 1))?.is_exact());
    Ok(())
}

fn party_with_aliases(aliases: &[&str]) -> Result<ElementTree, mismo_compare::Error> {
    let body: String = aliases
        .iter()
        .map(|a| format!("<ALIAS><FIRST>{a}</FIRST></ALIAS>"))
        .collect();
    load_str(&format!(
        "<DEAL><PARTIES><PARTY><ALIASES>{body}</ALIASES></PARTY></PARTIES></DEAL>"
    ))
}

#[test]
fn test_repeated_leaves_can_score_above_total() -> TestResult {
    let primary = party_with_aliases(&["Al", "Bo", "Cy"])?;
    let basis = party_with_aliases(&["Al", "Bo", "Di"])?;
    let table = pair(&parties(&primary), &parties(&basis));

    let rec = record(&table, &xpath(0, 1))?;
    assert!(!rec.is_exact());
    // two shared facts, all at the single ALIAS|FIRST location
    assert_eq!(rec.closest_score(), 2);
    assert_eq!(rec.total_comparable(), 1);
    assert_eq!(rec.differences_count(), Some(1));
    assert!(matches!(
        rec.verdict(),
        Verdict::Closest { score: 2, total: 1, .. }
    ));
    Ok(())
}

#[test]
fn test_no_compatible_candidate() -> TestResult {
    let primary = deal(&[("John", "Smith")])?;
    let basis = load_str(
        "<DEAL><PARTIES><PARTY><ROLE>lender</ROLE><NAME><FIRST>John</FIRST></NAME></PARTY></PARTIES></DEAL>",
    )?;
    let table = pair(&parties(&primary), &parties(&basis));

    let rec = record(&table, &xpath(0, 1))?;
    assert_eq!(rec.verdict(), Verdict::Unmatched);
    assert!(rec.exact_match().is_none());
    assert!(rec.closest_candidate().is_none());
    assert_eq!(rec.closest_score(), 0);
    Ok(())
}

#[test]
fn test_unconsumed_basis_node_stays_available() -> TestResult {
    let primary = deal(&[("John", "Smith"), ("Jon", "Smyth")])?;
    let basis = deal(&[("John", "Smith"), ("Jon", "Smith")])?;
    let table = pair(&parties(&primary), &parties(&basis));

    let first = record(&table, &xpath(0, 2))?;
    assert_eq!(
        first.exact_match().map(|n| n.xpath_str()),
        Some(xpath(0, 2))
    );

    let second = record(&table, &xpath(1, 2))?;
    assert_eq!(
        second.closest_candidate().map(|n| n.xpath_str()),
        Some(xpath(1, 2))
    );
    let total = i64::try_from(second.total_comparable())?;
    assert_eq!(second.closest_score(), total - 1);
    Ok(())
}

#[test]
fn test_closest_candidate_is_shared() -> TestResult {
    let primary = deal(&[("Jon", "Smith"), ("John", "Smyth")])?;
    let basis = deal(&[("John", "Smith")])?;
    let table = pair(&parties(&primary), &parties(&basis));

    for i in 0..2 {
        let rec = record(&table, &xpath(i, 2))?;
        assert_eq!(
            rec.closest_candidate().map(|n| n.xpath_str()),
            Some(xpath(0, 1))
        );
    }
    Ok(())
}

#[test]
fn test_tie_goes_to_first_candidate() -> TestResult {
    let primary = deal(&[("John", "Smith")])?;

    let basis = deal(&[("John", "Smyth"), ("Jon", "Smith")])?;
    let table = pair(&parties(&primary), &parties(&basis));
    let rec = record(&table, &xpath(0, 1))?;
    assert_eq!(rec.closest_score(), 1);
    assert_eq!(
        rec.closest_candidate().map(|n| n.xpath_str()),
        Some(xpath(0, 2))
    );
    assert_eq!(closest_first_name(rec).as_deref(), Some("John"));

    // same candidates, swapped: the other one now wins the tie
    let swapped = deal(&[("Jon", "Smith"), ("John", "Smyth")])?;
    let table = pair(&parties(&primary), &parties(&swapped));
    let rec = record(&table, &xpath(0, 1))?;
    assert_eq!(rec.closest_score(), 1);
    assert_eq!(
        rec.closest_candidate().map(|n| n.xpath_str()),
        Some(xpath(0, 2))
    );
    assert_eq!(closest_first_name(rec).as_deref(), Some("Jon"));
    Ok(())
}

#[test]
fn test_duplicate_identical_siblings_pair_in_order() -> TestResult {
    let primary = deal(&[("John", "Smith"), ("John", "Smith")])?;
    let basis = deal(&[("John", "Smith"), ("John", "Smith")])?;
    let table = pair(&parties(&primary), &parties(&basis));

    let exact: Vec<_> = table
        .records()
        .map(|r| r.exact_match().map(|n| n.xpath_str()))
        .collect();
    assert_eq!(exact, vec![Some(xpath(0, 2)), Some(xpath(1, 2))]);
    Ok(())
}

#[test]
fn test_earlier_exact_match_wins_over_later_one() -> TestResult {
    // basis PARTY[1] is scored for the second primary node but the exact
    // PARTY[2] further on replaces it
    let primary = deal(&[("John", "Smith"), ("John", "Smith")])?;
    let basis = deal(&[("John", "Smith"), ("John", "Smyth"), ("John", "Smith")])?;
    let table = pair(&parties(&primary), &parties(&basis));

    let exact: Vec<_> = table
        .records()
        .map(|r| r.exact_match().map(|n| n.xpath_str()))
        .collect();
    assert_eq!(exact, vec![Some(xpath(0, 3)), Some(xpath(2, 3))]);
    Ok(())
}

#[test]
fn test_surplus_duplicate_has_no_exact_partner() -> TestResult {
    let primary = deal(&[("John", "Smith"), ("John", "Smith")])?;
    let basis = deal(&[("John", "Smith")])?;
    let table = pair(&parties(&primary), &parties(&basis));

    let second = record(&table, &xpath(1, 2))?;
    assert_eq!(second.verdict(), Verdict::Unmatched);
    assert_eq!(second.closest_score(), 0);
    Ok(())
}

#[test]
fn test_pairing_is_repeatable() -> TestResult {
    let primary = deal(&[("John", "Smith"), ("Jane", "Doe"), ("Jon", "Smyth")])?;
    let basis = deal(&[("Jane", "Doe"), ("Jon", "Smith"), ("John", "Smith")])?;
    let (s, c) = (parties(&primary), parties(&basis));

    let render = |table: &MatchTable<'_>| format!("{table:?}");
    assert_eq!(render(&pair(&s, &c)), render(&pair(&s, &c)));
    Ok(())
}
