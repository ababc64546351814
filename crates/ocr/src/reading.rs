use netsketch_model::TextFragment;
use std::cmp::Ordering;

/// Order fragments the way a person reads a label: top line first, each
/// line left to right.
///
/// Two fragments share a line when their vertical centres are closer than
/// half the smaller of their heights.
#[must_use]
pub fn reading_order(fragments: &[TextFragment]) -> Vec<&TextFragment> {
    let mut by_top: Vec<&TextFragment> = fragments.iter().collect();
    by_top.sort_by(|a, b| {
        a.center()
            .y
            .partial_cmp(&b.center().y)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut lines: Vec<Vec<&TextFragment>> = Vec::new();
    for fragment in by_top {
        let same_line = lines
            .last()
            .and_then(|line| line.first())
            .is_some_and(|head| {
                let (a, b) = (head.bounds(), fragment.bounds());
                (a.cy - b.cy).abs() <= a.height.min(b.height) / 2.0
            });
        match lines.last_mut() {
            Some(line) if same_line => line.push(fragment),
            _ => lines.push(vec![fragment]),
        }
    }

    lines
        .into_iter()
        .flat_map(|mut line| {
            line.sort_by(|a, b| {
                a.center()
                    .x
                    .partial_cmp(&b.center().x)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.id.cmp(&b.id))
            });
            line
        })
        .collect()
}

/// Concatenate pieces of one label.
///
/// Pieces are separated by a space, except around `.` and `/` where OCR
/// tends to split addresses (`192.168.` + `1.0/24`).
#[must_use]
pub fn join_fragments<'a>(pieces: impl IntoIterator<Item = &'a TextFragment>) -> String {
    let mut joined = String::new();
    for piece in pieces {
        let text = piece.text.trim();
        if text.is_empty() {
            continue;
        }
        let glue = joined.ends_with(['.', '/']) || text.starts_with(['.', '/']);
        if !joined.is_empty() && !glue {
            joined.push(' ');
        }
        joined.push_str(text);
    }
    joined
}

/// [`reading_order`] followed by [`join_fragments`]
#[must_use]
pub fn read_label(fragments: &[TextFragment]) -> String {
    join_fragments(reading_order(fragments))
}
