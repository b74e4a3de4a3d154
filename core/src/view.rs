//! Pure derived view over a collection: search filter and sort.

use std::cmp::Ordering;

use crate::types::{Entity, FieldKind, FieldSpec};

/// Entities matching `term` on at least one of `search_fields`, ordered by
/// `sort_by` (insertion order when `None`).
pub fn filter_sorted<'a, E: Entity>(
    items: &'a [E],
    search_fields: &[E::Field],
    term: &str,
    sort_by: Option<E::Field>,
) -> Vec<&'a E> {
    let needle = term.to_lowercase();
    let mut view: Vec<&E> = items
        .iter()
        .filter(|item| matches_search(*item, search_fields, &needle))
        .collect();
    if let Some(key) = sort_by {
        view.sort_by(|a, b| compare_by(*a, *b, key));
    }
    view
}

/// `needle` must already be lower-cased. A missing field reads as `""`.
fn matches_search<E: Entity>(item: &E, search_fields: &[E::Field], needle: &str) -> bool {
    search_fields.iter().any(|field| {
        item.get(*field)
            .map(|value| value.to_lowercase().contains(needle))
            .unwrap_or(needle.is_empty())
    })
}

pub fn compare_by<E: Entity>(a: &E, b: &E, key: E::Field) -> Ordering {
    match key.kind() {
        FieldKind::Numeric => {
            let left = numeric_value(a.get(key).as_deref());
            let right = numeric_value(b.get(key).as_deref());
            left.partial_cmp(&right).unwrap_or(Ordering::Equal)
        }
        FieldKind::Text => locale_cmp(
            a.get(key).as_deref().unwrap_or(""),
            b.get(key).as_deref().unwrap_or(""),
        ),
    }
}

/// Missing, unparsable and non-finite values count as zero.
pub fn numeric_value(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Collation close to what browsers use for Latin-script UI text.
///
/// Letters compare by base letter first (accents and case ignored), then
/// unaccented before accented, then lower case before upper case. The final
/// tie-break on the raw strings keeps the order total.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| case_key(a).cmp(case_key(b)))
        .then_with(|| a.cmp(b))
}

fn primary_key(s: &str) -> String {
    let mut key = String::with_capacity(s.len());
    for c in s.chars().flat_map(char::to_lowercase) {
        match fold(c) {
            Folded::One(base) => key.push(base),
            Folded::Two(first, second) => {
                key.push(first);
                key.push(second);
            }
        }
    }
    key
}

fn case_key(s: &str) -> impl Iterator<Item = bool> + '_ {
    s.chars().map(char::is_uppercase)
}

enum Folded {
    One(char),
    Two(char, char),
}

/// Strip diacritics from a lower-case Latin letter.
fn fold(c: char) -> Folded {
    let base = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => 'c',
        'ď' | 'đ' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => 'i',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => 'o',
        'ŕ' | 'ř' => 'r',
        'ś' | 'ŝ' | 'ş' | 'š' => 's',
        'ţ' | 'ť' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        'æ' => return Folded::Two('a', 'e'),
        'œ' => return Folded::Two('o', 'e'),
        'ß' => return Folded::Two('s', 's'),
        other => other,
    };
    Folded::One(base)
}
