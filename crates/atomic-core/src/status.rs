use crate::types::ChangeType;

impl ChangeType {
    /// Maps a porcelain status code to a change type.
    ///
    /// Accepts single letters (`A`, `M`, `D`, `T`), rename/copy codes with an
    /// optional similarity score (`R100`, `C75`), untracked (`??`) and
    /// two-column `XY` codes. When the two columns disagree the most
    /// consequential state wins: deleted, then renamed, then added, then
    /// modified.
    #[must_use]
    pub fn from_status_code(code: &str) -> Option<Self> {
        let code = code.trim();
        if code.is_empty() {
            return None;
        }
        if code == "??" {
            return Some(Self::Added);
        }

        let letters = strip_similarity_score(code);
        if letters.is_empty() || letters.len() > 2 {
            return None;
        }

        let mut deleted = false;
        let mut renamed = false;
        let mut added = false;
        let mut modified = false;

        for c in letters.chars() {
            match c {
                'D' => deleted = true,
                'R' => renamed = true,
                'A' | 'C' => added = true,
                'M' | 'T' | 'U' => modified = true,
                ' ' | '.' => {}
                _ => return None,
            }
        }

        if deleted {
            Some(Self::Deleted)
        } else if renamed {
            Some(Self::Renamed)
        } else if added {
            Some(Self::Added)
        } else if modified {
            Some(Self::Modified)
        } else {
            None
        }
    }
}

fn strip_similarity_score(code: &str) -> &str {
    let starts_with_score_letter = code.starts_with('R') || code.starts_with('C');
    if starts_with_score_letter && code.len() > 1 && code[1..].chars().all(|c| c.is_ascii_digit())
    {
        &code[..1]
    } else {
        code
    }
}
