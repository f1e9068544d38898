//! Offset arithmetic over the inline children of one text block.

use crate::model::document::{Link, Marks, Node, Text};

/// Byte index of char `char_index` in `value`, or `value.len()` past the end.
pub(crate) fn byte_index(value: &str, char_index: usize) -> usize {
    value
        .char_indices()
        .nth(char_index)
        .map_or(value.len(), |(index, _)| index)
}

/// Splits `text` at char `at`, returning the right half.
fn split_text(text: &mut Text, at: usize) -> Text {
    let index = byte_index(&text.text, at);
    Text::marked(text.text.split_off(index), text.marks)
}

/// Leaf runs with their starting offset, link children included.
pub(crate) fn leaves(children: &[Node]) -> Vec<(usize, &Text)> {
    let mut out = Vec::new();
    let mut offset = 0;
    for child in children {
        match child {
            Node::Text(text) => {
                out.push((offset, text));
                offset += text.len();
            }
            Node::Link(link) => {
                for text in &link.children {
                    out.push((offset, text));
                    offset += text.len();
                }
            }
            Node::Block(block) => offset += block.children.iter().map(Node::len).sum::<usize>(),
        }
    }
    out
}

pub(crate) fn leaves_mut(children: &mut [Node]) -> Vec<(usize, &mut Text)> {
    let mut out = Vec::new();
    let mut offset = 0;
    for child in children.iter_mut() {
        match child {
            Node::Text(text) => {
                let len = text.len();
                out.push((offset, text));
                offset += len;
            }
            Node::Link(link) => {
                for text in link.children.iter_mut() {
                    let len = text.len();
                    out.push((offset, text));
                    offset += len;
                }
            }
            Node::Block(block) => offset += block.children.iter().map(Node::len).sum::<usize>(),
        }
    }
    out
}

/// Spans `(child_index, start, end)` of every top-level child.
pub(crate) fn child_spans(children: &[Node]) -> Vec<(usize, usize, usize)> {
    let mut offset = 0;
    children
        .iter()
        .enumerate()
        .map(|(index, child)| {
            let start = offset;
            offset += child.len();
            (index, start, offset)
        })
        .collect()
}

/// Ensures a leaf boundary at `at`, splitting runs inside links as well.
pub(crate) fn split_leaves_at(children: &mut Vec<Node>, at: usize) {
    let mut offset = 0;
    for index in 0..children.len() {
        let len = children[index].len();
        if at > offset && at < offset + len {
            match &mut children[index] {
                Node::Text(text) => {
                    let right = split_text(text, at - offset);
                    children.insert(index + 1, Node::Text(right));
                }
                Node::Link(link) => split_link_leaves_at(link, at - offset),
                Node::Block(_) => {}
            }
            return;
        }
        offset += len;
    }
}

fn split_link_leaves_at(link: &mut Link, at: usize) {
    let mut offset = 0;
    for index in 0..link.children.len() {
        let len = link.children[index].len();
        if at > offset && at < offset + len {
            let right = split_text(&mut link.children[index], at - offset);
            link.children.insert(index + 1, right);
            return;
        }
        offset += len;
    }
}

/// Ensures a top-level child boundary at `at`, splitting a link in two when
/// `at` falls inside it. Both halves keep the url.
pub(crate) fn split_children_at(children: &mut Vec<Node>, at: usize) {
    split_leaves_at(children, at);

    let mut offset = 0;
    for index in 0..children.len() {
        let len = children[index].len();
        if at > offset && at < offset + len {
            if let Node::Link(link) = &mut children[index] {
                let mut leaf_offset = offset;
                let mut cut = link.children.len();
                for (leaf_index, leaf) in link.children.iter().enumerate() {
                    if leaf_offset == at {
                        cut = leaf_index;
                        break;
                    }
                    leaf_offset += leaf.len();
                }
                let right = Link::new(link.url.clone(), link.children.split_off(cut));
                children.insert(index + 1, Node::Link(right));
            }
            return;
        }
        offset += len;
    }
}

/// Removes chars in `[start, end)` from the inline children.
pub(crate) fn remove_range(children: &mut Vec<Node>, start: usize, end: usize) {
    if start >= end {
        return;
    }
    split_leaves_at(children, end);
    split_leaves_at(children, start);

    let inside = |from: usize, len: usize| len > 0 && from >= start && from + len <= end;
    let mut offset = 0;
    let mut kept = Vec::with_capacity(children.len());
    for child in children.drain(..) {
        let len = child.len();
        match child {
            Node::Text(text) => {
                if !inside(offset, len) {
                    kept.push(Node::Text(text));
                }
            }
            Node::Link(mut link) => {
                let mut leaf_offset = offset;
                link.children.retain(|leaf| {
                    let leaf_len = leaf.len();
                    let keep = !inside(leaf_offset, leaf_len);
                    leaf_offset += leaf_len;
                    keep
                });
                kept.push(Node::Link(link));
            }
            other => kept.push(other),
        }
        offset += len;
    }
    *children = kept;
}

/// Inserts `value` at `at` with `marks`.
///
/// Text at a link edge goes to the neighbouring plain run, so links never
/// grow from their edges. Inside a link the text joins the link.
pub(crate) fn insert_text(children: &mut Vec<Node>, at: usize, value: &str, marks: Marks) {
    let spans = child_spans(children);

    for &(index, start, end) in &spans {
        if at > start && at < end {
            if let Node::Link(link) = &mut children[index] {
                insert_into_runs(&mut link.children, at - start, value, marks);
                return;
            }
        }
    }

    let candidates: Vec<(usize, usize)> = spans
        .iter()
        .filter(|(index, start, end)| {
            matches!(children[*index], Node::Text(_)) && *start <= at && at <= *end
        })
        .map(|(index, start, _)| (*index, *start))
        .collect();
    let chosen = candidates
        .iter()
        .find(|(index, _)| matches!(&children[*index], Node::Text(t) if t.marks == marks))
        .or(candidates.first())
        .copied();

    match chosen {
        Some((index, start)) => {
            if let Node::Text(text) = &mut children[index] {
                if text.marks == marks {
                    let byte = byte_index(&text.text, at - start);
                    text.text.insert_str(byte, value);
                } else {
                    let right = split_text(text, at - start);
                    children.insert(index + 1, Node::Text(Text::marked(value, marks)));
                    children.insert(index + 2, Node::Text(right));
                }
            }
        }
        None => {
            let index = spans.iter().filter(|(_, _, end)| *end <= at).count();
            children.insert(index, Node::Text(Text::marked(value, marks)));
        }
    }
}

fn insert_into_runs(runs: &mut Vec<Text>, at: usize, value: &str, marks: Marks) {
    let mut offset = 0;
    for index in 0..runs.len() {
        let len = runs[index].len();
        if at >= offset && at <= offset + len {
            if runs[index].marks == marks {
                let byte = byte_index(&runs[index].text, at - offset);
                runs[index].text.insert_str(byte, value);
            } else {
                let right = split_text(&mut runs[index], at - offset);
                runs.insert(index + 1, Text::marked(value, marks));
                runs.insert(index + 2, right);
            }
            return;
        }
        offset += len;
    }
    runs.push(Text::marked(value, marks));
}

/// Marks of the run a caret at `at` continues: the run holding the char
/// before the caret, or the first run at offset zero.
pub(crate) fn marks_at(children: &[Node], at: usize) -> Marks {
    let runs = leaves(children);
    if at > 0 {
        if let Some((_, text)) = runs
            .iter()
            .find(|(start, text)| *start < at && at <= start + text.len())
        {
            return text.marks;
        }
    }
    runs.first().map(|(_, text)| text.marks).unwrap_or_default()
}
