//! # pla-parser
//!
//! Link reference parser for markdown note bodies, using a pest PEG grammar
//! (`src/links.pest`).
//!
//! Recognizes wikilinks (`[[target]]`, `[[target#heading|alias]]`) and
//! internal markdown links (`[text](Some%20Note.md)`). Embeds (`![[...]]`,
//! `![alt](...)`), external URLs, and anything inside inline code or fenced
//! code blocks are not links.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use pla_core::{LinkReference, PlaError};

#[derive(Parser)]
#[grammar = "links.pest"]
struct LinkGrammar;

/// Parse every outgoing link in a note body, in document order.
///
/// # Errors
///
/// Returns [`PlaError::Parse`] if the grammar rejects the input. The grammar
/// accepts any text, so this only happens on an internal grammar fault.
pub fn parse_links(body: &str) -> Result<Vec<LinkReference>, PlaError> {
    let mut pairs =
        LinkGrammar::parse(Rule::document, body).map_err(|e| PlaError::Parse(e.to_string()))?;
    let Some(document) = pairs.next() else {
        return Ok(Vec::new());
    };

    let links = document
        .into_inner()
        .filter_map(|pair| match pair.as_rule() {
            Rule::wikilink => wikilink(pair),
            Rule::md_link => markdown_link(pair),
            _ => None,
        })
        .collect();
    Ok(links)
}

fn wikilink(pair: Pair<'_, Rule>) -> Option<LinkReference> {
    let mut inner = pair.into_inner();
    let target = inner.next()?.as_str().trim();
    if target.is_empty() {
        return None;
    }
    let alias = inner
        .next()
        .map(|p| p.as_str().trim())
        .filter(|a| !a.is_empty());

    Some(match alias {
        Some(alias) => LinkReference::aliased(target, alias),
        None => LinkReference::new(target),
    })
}

fn markdown_link(pair: Pair<'_, Rule>) -> Option<LinkReference> {
    let mut inner = pair.into_inner();
    let text = inner.next()?.as_str().trim();
    let raw_target = inner.next()?.as_str();

    if is_external(raw_target) {
        return None;
    }
    let decoded = urlencoding::decode(raw_target)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| raw_target.to_string());
    let target = strip_md_extension(&decoded);
    if target.is_empty() {
        return None;
    }

    if text.is_empty() || text == target {
        Some(LinkReference::new(target))
    } else {
        Some(LinkReference::aliased(target, text))
    }
}

fn is_external(target: &str) -> bool {
    target.contains("://") || target.starts_with("mailto:") || target.starts_with('#')
}

/// `Note.md#Heading` → `Note#Heading`.
fn strip_md_extension(target: &str) -> String {
    let (path, subpath) = match target.split_once('#') {
        Some((path, sub)) => (path, Some(sub)),
        None => (target, None),
    };
    let path = path.strip_suffix(".md").unwrap_or(path);
    match subpath {
        Some(sub) => format!("{path}#{sub}"),
        None => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Vec<LinkReference> {
        parse_links(body).unwrap()
    }

    #[test]
    fn plain_and_aliased_wikilinks() {
        let links = parse("See [[Alpha]] and [[Beta Project|beta]] today.");
        assert_eq!(
            links,
            vec![
                LinkReference::new("Alpha"),
                LinkReference::aliased("Beta Project", "beta"),
            ]
        );
    }

    #[test]
    fn heading_links_keep_subpath() {
        let links = parse("[[Alpha#Goals|the goals]]");
        assert_eq!(links, vec![LinkReference::aliased("Alpha#Goals", "the goals")]);
    }

    #[test]
    fn embeds_are_not_links() {
        assert!(parse("![[diagram.png]] ![alt](pic.png)").is_empty());
    }

    #[test]
    fn code_is_skipped() {
        let body = "Use `[[not a link]]` here.\n```\n[[also not]]\n```\n[[Real]]";
        assert_eq!(parse(body), vec![LinkReference::new("Real")]);
    }

    #[test]
    fn unclosed_fence_swallows_rest() {
        assert!(parse("```\n[[hidden]]\n").is_empty());
    }

    #[test]
    fn markdown_links_are_decoded() {
        let links = parse("[notes](Hot%20Reload.md) and [Alpha](Alpha.md#Goals)");
        assert_eq!(
            links,
            vec![
                LinkReference::aliased("Hot Reload", "notes"),
                LinkReference::aliased("Alpha#Goals", "Alpha"),
            ]
        );
    }

    #[test]
    fn markdown_link_text_matching_target_has_no_alias() {
        assert_eq!(parse("[Alpha](Alpha.md)"), vec![LinkReference::new("Alpha")]);
    }

    #[test]
    fn external_links_are_skipped() {
        assert!(parse("[site](https://example.com) [me](mailto:a@b.c) [up](#top)").is_empty());
    }

    #[test]
    fn empty_alias_and_blank_target_are_ignored() {
        assert_eq!(parse("[[Alpha|]] [[   ]]"), vec![LinkReference::new("Alpha")]);
    }

    #[test]
    fn links_do_not_span_lines() {
        assert!(parse("[[Alpha\nBeta]]").is_empty());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn any_text_parses_and_aliases_are_non_empty(body in "[\\[\\]|!#()a-c `\n]{0,60}") {
                let links = parse_links(&body).unwrap();
                for link in links {
                    prop_assert!(!link.target.trim().is_empty());
                    if let Some(alias) = link.display_text {
                        prop_assert!(!alias.is_empty());
                    }
                }
            }
        }
    }
}
