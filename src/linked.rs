//! Same-document linked position resolution.

use tower_lsp::lsp_types::Position;

use crate::document::TextBuffer;
use crate::mapping::LinkedMap;

/// Positions in `buffer` semantically linked to `position`.
pub fn linked_positions_of<'a>(
    buffer: &'a TextBuffer,
    linked: &'a dyn LinkedMap,
    position: Position,
) -> impl Iterator<Item = Position> + 'a {
    let offset = buffer.offset_at(position);
    linked
        .linked_offsets(offset)
        .map(move |linked_offset| buffer.position_at(linked_offset))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tower_lsp::lsp_types::Url;

    use super::*;
    use crate::mapping::{CodeInformation, LinkedCodeMap, Mapping};

    fn buffer(text: &str) -> TextBuffer {
        TextBuffer::new(Url::parse("file:///gen.ts").unwrap(), "typescript", 0, Arc::from(text))
    }

    #[test]
    fn resolves_linked_positions() {
        // `let foo;\nfoo = 1;`: the declaration and the assignment target are linked.
        let buf = buffer("let foo;\nfoo = 1;");
        let linked = LinkedCodeMap::new(vec![Mapping::new(4, 9, 3, CodeInformation::default())]);

        let positions: Vec<_> = linked_positions_of(&buf, &linked, Position::new(0, 5)).collect();
        assert_eq!(positions, vec![Position::new(1, 1)]);

        let back: Vec<_> = linked_positions_of(&buf, &linked, Position::new(1, 1)).collect();
        assert_eq!(back, vec![Position::new(0, 5)]);
    }

    #[test]
    fn unlinked_position_yields_nothing() {
        let buf = buffer("let foo;\nfoo = 1;");
        let linked = LinkedCodeMap::new(vec![Mapping::new(4, 9, 3, CodeInformation::default())]);
        assert_eq!(linked_positions_of(&buf, &linked, Position::new(1, 6)).count(), 0);
    }

    #[test]
    fn self_links_come_from_the_map() {
        let buf = buffer("abc");
        let linked = LinkedCodeMap::new(vec![Mapping::new(0, 0, 3, CodeInformation::default())]);
        let positions: Vec<_> = linked_positions_of(&buf, &linked, Position::new(0, 1)).collect();
        assert_eq!(positions, vec![Position::new(0, 1), Position::new(0, 1)]);
    }
}
