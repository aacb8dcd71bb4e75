use super::Parameter;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_PARAM_KEYWORD: Regex =
        Regex::new(r"\b(parameter|localparam)\b").unwrap();
    static ref RE_ASSIGNMENT: Regex = Regex::new(
        r"(?s)^\s*(?:(?:parameter|localparam)\s+)?(?:(?:integer|int|logic|bit|reg)\s+)?(?:signed\s+)?(?:\[[^\]]*\]\s*)?(\w+)\s*=\s*(.+?)\s*$"
    ).unwrap();
}

/// Declarations found in a module, split by keyword.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Declarations {
    pub parameters: Vec<Parameter>,
    /// `localparam` names with their raw values, in source order.
    pub localparams: Vec<(String, String)>,
}

/// Collect `parameter` and `localparam` assignments. Lists such as
/// `localparam A = 0, B = 1;` yield one entry per name.
pub fn extract_declarations(text: &str) -> Declarations {
    let mut rv = Declarations::default();
    let mut consumed = 0;

    for keyword in RE_PARAM_KEYWORD.find_iter(text) {
        if keyword.start() < consumed {
            continue;
        }

        let is_local = keyword.as_str() == "localparam";
        let (items, end) = declaration_items(text, keyword.end());
        consumed = end;

        for item in items {
            if let Some(caps) = RE_ASSIGNMENT.captures(item) {
                let name = caps[1].to_string();
                let value = caps[2].to_string();

                if is_local {
                    rv.localparams.push((name, value));
                } else {
                    rv.parameters.push(Parameter { name, default_value: Some(value) });
                }
            }
        }
    }

    rv
}

/// Split the text following a keyword into its top-level comma
/// separated items. Stops at `;` or at the `)` closing an enclosing
/// parameter port list.
fn declaration_items(text: &str, start: usize) -> (Vec<&str>, usize) {
    let mut items = vec![];
    let mut depth = 0i32;
    let mut item_start = start;

    for (offset, c) in text[start..].char_indices() {
        let pos = start + offset;
        match c {
            '(' | '{' | '[' => depth += 1,
            ')' | '}' | ']' if depth > 0 => depth -= 1,
            ')' | ';' => {
                items.push(&text[item_start..pos]);
                return (items, pos);
            }
            ',' if depth == 0 => {
                items.push(&text[item_start..pos]);
                item_start = pos + 1;
            }
            _ => {}
        }
    }

    items.push(&text[item_start..]);
    (items, text.len())
}
