// Geração de slugs de categoria: translitera diacríticos turcos (e acentos
// latinos comuns) para ASCII, minúsculas, tudo que não for alfanumérico vira hífen.

fn transliterate(c: char) -> Option<&'static str> {
    let s = match c {
        'ç' | 'Ç' => "c",
        'ğ' | 'Ğ' => "g",
        'ı' | 'I' | 'İ' | 'i' => "i",
        'ö' | 'Ö' => "o",
        'ş' | 'Ş' => "s",
        'ü' | 'Ü' => "u",
        'â' | 'Â' | 'á' | 'à' | 'ã' => "a",
        'î' | 'Î' | 'í' => "i",
        'û' | 'Û' | 'ú' => "u",
        'é' | 'ê' => "e",
        'ó' | 'ô' | 'õ' => "o",
        _ => return None,
    };
    Some(s)
}

pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for c in input.chars() {
        let piece: Option<String> = if let Some(t) = transliterate(c) {
            Some(t.to_string())
        } else if c.is_ascii_alphanumeric() {
            Some(c.to_ascii_lowercase().to_string())
        } else {
            None
        };

        match piece {
            Some(p) => {
                if pending_hyphen && !out.is_empty() {
                    out.push('-');
                }
                pending_hyphen = false;
                out.push_str(&p);
            }
            None => pending_hyphen = true,
        }
    }

    out
}
