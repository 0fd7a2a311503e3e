use crate::sync::Mutex;

/// Per-cycle log of task start/end markers.
///
/// Each executed node appends its label twice: once immediately before the
/// task body runs and once immediately after. A finished cycle therefore
/// leaves one `ll` pair per node in the buffer, interleaved under the
/// graph's precedence order: a parent's second marker always lands before
/// the child's first one.
pub(crate) struct ExecTrace {
    buf: Mutex<String>,
    capacity: usize,
}

impl ExecTrace {
    /// Buffer sized for one cycle over `nodes` nodes, two marks per node.
    pub(crate) fn for_nodes(nodes: usize) -> Self {
        let capacity = nodes * 2;
        Self {
            buf: Mutex::new(String::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append one marker.
    pub(crate) fn mark(&self, label: char) {
        self.buf.lock().expect("ExecTrace::mark").push(label);
    }

    /// Take the finished cycle's trace, leaving an empty buffer of the same
    /// capacity behind for the next cycle.
    pub(crate) fn take(&self) -> String {
        let mut buf = self.buf.lock().expect("ExecTrace::take");
        core::mem::replace(&mut *buf, String::with_capacity(self.capacity))
    }
}

/// Whether `trace` is one complete traversal over `labels`: every label
/// occurs exactly twice and nothing else occurs at all.
pub fn is_complete(trace: &str, labels: impl IntoIterator<Item = char>) -> bool {
    let mut expected = 0usize;
    for label in labels {
        if trace.chars().filter(|&c| c == label).count() != 2 {
            return false;
        }
        expected += 2;
    }
    trace.chars().count() == expected
}

/// Whether `trace` shows `parent` finishing before `child` started: the
/// second occurrence of `parent` precedes the first occurrence of `child`.
///
/// Returns `false` when either label is missing a start or end marker.
pub fn respects_precedence(trace: &str, parent: char, child: char) -> bool {
    let Some((_, parent_end)) = occurrences(trace, parent) else {
        return false;
    };
    let Some((child_start, _)) = occurrences(trace, child) else {
        return false;
    };
    parent_end < child_start
}

/// Byte positions of the first two occurrences of `label` in `trace`.
fn occurrences(trace: &str, label: char) -> Option<(usize, usize)> {
    let mut markers = trace
        .char_indices()
        .filter(|&(_, c)| c == label)
        .map(|(at, _)| at);
    let start = markers.next()?;
    let end = markers.next()?;
    Some((start, end))
}
