// src/common/slug.rs

use rand::{distributions::Alphanumeric, Rng};

const SUFFIX_LEN: usize = 6;

fn fold_accent(c: char) -> Option<char> {
    let folded = match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        _ => return None,
    };
    Some(folded)
}

/// "Padaria São João" -> "padaria-sao-joao"
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        let c = fold_accent(c).unwrap_or(c);
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c);
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Slug único da empresa: nome + 6 caracteres aleatórios.
pub fn company_slug(name: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();

    match slugify(name) {
        base if base.is_empty() => suffix,
        base => format!("{}-{}", base, suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_folds_accents_and_collapses_separators() {
        assert_eq!(slugify("Padaria São João"), "padaria-sao-joao");
        assert_eq!(slugify("  Acme -- Consultoria!! "), "acme-consultoria");
        assert_eq!(slugify("Ação & Cia. Ltda"), "acao-cia-ltda");
    }

    #[test]
    fn company_slug_appends_random_suffix() {
        let slug = company_slug("Acme Consultoria");
        let (base, suffix) = slug.rsplit_once('-').expect("deve ter sufixo");
        assert_eq!(base, "acme-consultoria");
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn name_without_letters_still_gets_a_slug() {
        assert_eq!(company_slug("!!!").len(), SUFFIX_LEN);
    }
}
