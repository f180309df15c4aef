//! URL slugs for produtos, projetos, and ensaios.
//!
//! Slugs are ASCII: accents are folded to their base letter and any run of
//! other characters becomes a single `-`.

/// Build a slug from a display name.
///
/// ```
/// use tna_core::slug::slugify;
///
/// assert_eq!(slugify("Ensaio Verão 2025"), "ensaio-verao-2025");
/// assert_eq!(slugify("  Álbum -- Clássico! "), "album-classico");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for ch in text.chars().flat_map(char::to_lowercase) {
        let folded = fold_accent(ch);
        if folded.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(folded);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Candidate slugs in order: `base`, `base-1`, `base-2`, ...
///
/// The caller takes the first one that is not already in use.
pub fn slug_candidates(base: &str) -> impl Iterator<Item = String> + '_ {
    std::iter::once(base.to_string()).chain((1u32..).map(move |n| format!("{base}-{n}")))
}

/// Map a lower-case Latin letter with a diacritic to its base letter.
fn fold_accent(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_portuguese_accents() {
        assert_eq!(slugify("Coleção Outono"), "colecao-outono");
        assert_eq!(slugify("ÁGUA"), "agua");
    }

    #[test]
    fn collapses_separators() {
        assert_eq!(slugify("a___b   c"), "a-b-c");
        assert_eq!(slugify("--início--"), "inicio");
    }

    #[test]
    fn empty_when_no_alphanumerics() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn drops_non_latin_letters() {
        assert_eq!(slugify("foto 写真 2"), "foto-2");
    }

    #[test]
    fn candidates_add_numeric_suffix() {
        let first: Vec<String> = slug_candidates("book").take(3).collect();
        assert_eq!(first, vec!["book", "book-1", "book-2"]);
    }
}
