use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectorAttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectorPseudoClass {
    FirstChild,
    LastChild,
    Not(Vec<Vec<SelectorPart>>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SelectorStep {
    pub(crate) tag: Option<String>,
    pub(crate) universal: bool,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) attrs: Vec<SelectorAttrCondition>,
    pub(crate) pseudo_classes: Vec<SelectorPseudoClass>,
}

impl SelectorStep {
    pub(crate) fn id_only(&self) -> Option<&str> {
        if !self.universal
            && self.tag.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && self.pseudo_classes.is_empty()
        {
            self.id.as_deref()
        } else {
            None
        }
    }

    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && !self.universal
            && self.pseudo_classes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SelectorCombinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorPart {
    pub(crate) step: SelectorStep,
    // Relation to the previous (left) part.
    pub(crate) combinator: Option<SelectorCombinator>,
}

pub(crate) fn parse_selector_groups(selector: &str) -> Result<Vec<Vec<SelectorPart>>> {
    split_top_level(selector, |ch| ch == ',', false)?
        .iter()
        .map(|group| parse_selector_chain(group))
        .collect()
}

fn parse_selector_chain(selector: &str) -> Result<Vec<SelectorPart>> {
    let selector = selector.trim();
    if selector.is_empty() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }

    let mut steps = Vec::new();
    let mut pending_combinator: Option<SelectorCombinator> = None;

    for token in tokenize_selector(selector)? {
        let combinator = match token.as_str() {
            ">" => Some(SelectorCombinator::Child),
            "+" => Some(SelectorCombinator::AdjacentSibling),
            "~" => Some(SelectorCombinator::GeneralSibling),
            _ => None,
        };
        if let Some(combinator) = combinator {
            if pending_combinator.is_some() || steps.is_empty() {
                return Err(Error::UnsupportedSelector(selector.into()));
            }
            pending_combinator = Some(combinator);
            continue;
        }

        let step = parse_selector_step(&token)?;
        let combinator = if steps.is_empty() {
            None
        } else {
            Some(
                pending_combinator
                    .take()
                    .unwrap_or(SelectorCombinator::Descendant),
            )
        };
        steps.push(SelectorPart { step, combinator });
    }

    if steps.is_empty() || pending_combinator.is_some() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }

    Ok(steps)
}

// Splits on `is_separator` outside brackets and parens. With `keep_separators`
// the separators become their own entries.
fn split_top_level(
    selector: &str,
    is_separator: impl Fn(char) -> bool,
    keep_separators: bool,
) -> Result<Vec<String>> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut bracket_depth = 0usize;
    let mut paren_depth = 0usize;

    for ch in selector.chars() {
        match ch {
            '[' => bracket_depth += 1,
            ']' => {
                bracket_depth = bracket_depth
                    .checked_sub(1)
                    .ok_or_else(|| Error::UnsupportedSelector(selector.into()))?;
            }
            '(' => paren_depth += 1,
            ')' => {
                paren_depth = paren_depth
                    .checked_sub(1)
                    .ok_or_else(|| Error::UnsupportedSelector(selector.into()))?;
            }
            ch if bracket_depth == 0 && paren_depth == 0 && is_separator(ch) => {
                let trimmed = current.trim();
                if keep_separators {
                    if !trimmed.is_empty() {
                        parts.push(trimmed.to_string());
                    }
                    if !ch.is_ascii_whitespace() {
                        parts.push(ch.to_string());
                    }
                } else {
                    if trimmed.is_empty() {
                        return Err(Error::UnsupportedSelector(selector.into()));
                    }
                    parts.push(trimmed.to_string());
                }
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }

    if bracket_depth != 0 || paren_depth != 0 {
        return Err(Error::UnsupportedSelector(selector.into()));
    }

    let trimmed = current.trim();
    if trimmed.is_empty() {
        if !keep_separators {
            return Err(Error::UnsupportedSelector(selector.into()));
        }
    } else {
        parts.push(trimmed.to_string());
    }
    Ok(parts)
}

fn tokenize_selector(selector: &str) -> Result<Vec<String>> {
    split_top_level(
        selector,
        |ch| matches!(ch, '>' | '+' | '~') || ch.is_ascii_whitespace(),
        true,
    )
}

fn parse_selector_step(part: &str) -> Result<SelectorStep> {
    let part = part.trim();
    let bytes = part.as_bytes();
    let mut i = 0usize;
    let mut step = SelectorStep::default();

    while i < bytes.len() {
        match bytes[i] {
            b'*' => {
                if step.universal || step.tag.is_some() {
                    return Err(Error::UnsupportedSelector(part.into()));
                }
                step.universal = true;
                i += 1;
            }
            b'#' => {
                let Some((id, next)) = parse_selector_ident(part, i + 1) else {
                    return Err(Error::UnsupportedSelector(part.into()));
                };
                if step.id.replace(id).is_some() {
                    return Err(Error::UnsupportedSelector(part.into()));
                }
                i = next;
            }
            b'.' => {
                let Some((class_name, next)) = parse_selector_ident(part, i + 1) else {
                    return Err(Error::UnsupportedSelector(part.into()));
                };
                step.classes.push(class_name);
                i = next;
            }
            b'[' => {
                let (attr, next) = parse_selector_attr_condition(part, i)?;
                step.attrs.push(attr);
                i = next;
            }
            b':' => {
                let (pseudo, next) = parse_selector_pseudo(part, i)?;
                step.pseudo_classes.push(pseudo);
                i = next;
            }
            _ => {
                if !step.is_empty() {
                    return Err(Error::UnsupportedSelector(part.into()));
                }
                let Some((tag, next)) = parse_selector_ident(part, i) else {
                    return Err(Error::UnsupportedSelector(part.into()));
                };
                step.tag = Some(tag);
                i = next;
            }
        }
    }

    if step.is_empty() {
        return Err(Error::UnsupportedSelector(part.into()));
    }
    Ok(step)
}

fn parse_selector_pseudo(part: &str, colon: usize) -> Result<(SelectorPseudoClass, usize)> {
    let start = colon + 1;
    let Some((name, after_name)) = parse_selector_ident(part, start) else {
        return Err(Error::UnsupportedSelector(part.into()));
    };
    match name.as_str() {
        "first-child" => Ok((SelectorPseudoClass::FirstChild, after_name)),
        "last-child" => Ok((SelectorPseudoClass::LastChild, after_name)),
        "not" => {
            if part.as_bytes().get(after_name) != Some(&b'(') {
                return Err(Error::UnsupportedSelector(part.into()));
            }
            let close = find_matching_paren(part, after_name)
                .ok_or_else(|| Error::UnsupportedSelector(part.into()))?;
            let inner = &part[after_name + 1..close];
            let groups = parse_selector_groups(inner)?;
            Ok((SelectorPseudoClass::Not(groups), close + 1))
        }
        _ => Err(Error::UnsupportedSelector(part.into())),
    }
}

fn find_matching_paren(src: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, b) in src.bytes().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_selector_ident(src: &str, start: usize) -> Option<(String, usize)> {
    let bytes = src.as_bytes();
    if start >= bytes.len() || !is_selector_ident_char(bytes[start]) {
        return None;
    }
    let mut end = start + 1;
    while end < bytes.len() && is_selector_ident_char(bytes[end]) {
        end += 1;
    }
    Some((src.get(start..end)?.to_string(), end))
}

fn is_selector_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

fn parse_selector_attr_condition(
    src: &str,
    open_bracket: usize,
) -> Result<(SelectorAttrCondition, usize)> {
    let bytes = src.as_bytes();
    let mut i = open_bracket + 1;
    let mut quote: Option<u8> = None;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }

        if b == b'\'' || b == b'"' {
            quote = Some(b);
            i += 1;
            continue;
        }

        if b == b']' {
            let body = src
                .get(open_bracket + 1..i)
                .map(str::trim)
                .filter(|body| !body.is_empty())
                .ok_or_else(|| Error::UnsupportedSelector(src.into()))?;
            let cond = if let Some((key, value)) = body.split_once('=') {
                let key = key.trim().to_ascii_lowercase();
                if key.is_empty() {
                    return Err(Error::UnsupportedSelector(src.into()));
                }
                let value = value.trim();
                let value = if value.len() >= 2
                    && ((value.starts_with('"') && value.ends_with('"'))
                        || (value.starts_with('\'') && value.ends_with('\'')))
                {
                    value[1..value.len() - 1].to_string()
                } else {
                    value.to_string()
                };
                SelectorAttrCondition::Eq { key, value }
            } else {
                SelectorAttrCondition::Exists {
                    key: body.to_ascii_lowercase(),
                }
            };
            return Ok((cond, i + 1));
        }

        i += 1;
    }

    Err(Error::UnsupportedSelector(src.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_split_outside_brackets() -> Result<()> {
        let groups = parse_selector_groups(".section, .service-card")?;
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0][0].step.classes, vec!["section".to_string()]);

        let groups = parse_selector_groups("[data-x='a,b']")?;
        assert_eq!(groups.len(), 1);
        Ok(())
    }

    #[test]
    fn combinators_are_attached_to_the_right_part() -> Result<()> {
        let groups = parse_selector_groups("#reviewDots > button.review-dot + button")?;
        let chain = &groups[0];
        assert_eq!(chain.len(), 3);
        assert_eq!(chain[0].combinator, None);
        assert_eq!(chain[1].combinator, Some(SelectorCombinator::Child));
        assert_eq!(chain[2].combinator, Some(SelectorCombinator::AdjacentSibling));
        Ok(())
    }

    #[test]
    fn attribute_values_are_unquoted() -> Result<()> {
        let groups = parse_selector_groups("[name=\"date\"]")?;
        assert_eq!(
            groups[0][0].step.attrs,
            vec![SelectorAttrCondition::Eq {
                key: "name".into(),
                value: "date".into()
            }]
        );
        Ok(())
    }

    #[test]
    fn invalid_selectors_are_rejected() {
        for selector in ["", ">", "a >", "[x", "a,,b", ":hover", "div#a#b"] {
            assert!(
                matches!(
                    parse_selector_groups(selector),
                    Err(Error::UnsupportedSelector(_))
                ),
                "{selector} should be rejected"
            );
        }
    }
}
