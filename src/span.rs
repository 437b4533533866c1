/// A source location attached to an operation or a config entry:
/// file ID + byte offset range.
///
/// Operations built programmatically carry `Span::dummy()`. Ops created
/// by a rewrite inherit the span of the op they replace.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub file_id: u16,
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(file_id: u16, start: u32, end: u32) -> Self {
        Self {
            file_id,
            start,
            end,
        }
    }

    pub fn dummy() -> Self {
        Self {
            file_id: 0,
            start: 0,
            end: 0,
        }
    }

    pub fn is_dummy(&self) -> bool {
        self.start == 0 && self.end == 0
    }

    pub fn merge(self, other: Span) -> Span {
        debug_assert_eq!(self.file_id, other.file_id);
        Span {
            file_id: self.file_id,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dummy_span() {
        assert!(Span::dummy().is_dummy());
        assert!(!Span::new(0, 3, 7).is_dummy());
        assert_eq!(Span::default(), Span::dummy());
    }

    #[test]
    fn test_merge() {
        let a = Span::new(1, 10, 20);
        let b = Span::new(1, 4, 12);
        assert_eq!(a.merge(b), Span::new(1, 4, 20));
    }
}
