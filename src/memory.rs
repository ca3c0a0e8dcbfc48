use crate::constants::PageId;

/// Resident pages of a paging simulation, one slot per frame
///
/// `None` marks a frame that has not been filled yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSet {
    slots: Vec<Option<PageId>>,
}

impl FrameSet {
    /// Create a frame set with every slot empty
    pub fn new(frame_count: usize) -> Self {
        FrameSet {
            slots: vec![None; frame_count],
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Read the page resident in a slot
    #[inline]
    pub fn get(&self, slot: usize) -> Option<PageId> {
        self.slots[slot]
    }

    /// Slot holding `page`, if it is resident
    pub fn find(&self, page: PageId) -> Option<usize> {
        self.slots.iter().position(|&resident| resident == Some(page))
    }

    /// Lowest-index slot that has never been filled
    pub fn first_empty(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Overwrite a slot, returning the page that was evicted (if any)
    pub fn install(&mut self, slot: usize, page: PageId) -> Option<PageId> {
        self.slots[slot].replace(page)
    }

    pub fn resident_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn slots(&self) -> &[Option<PageId>] {
        &self.slots
    }
}

impl std::fmt::Display for FrameSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            match slot {
                Some(page) => write!(f, "{}", page)?,
                None => write!(f, "-")?,
            }
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_set_initialization() {
        let frames = FrameSet::new(3);
        // All slots start empty
        assert_eq!(frames.capacity(), 3);
        assert_eq!(frames.resident_count(), 0);
        assert_eq!(frames.first_empty(), Some(0));
        assert_eq!(frames.get(2), None);
    }

    #[test]
    fn test_install_and_find() {
        let mut frames = FrameSet::new(3);

        assert_eq!(frames.install(1, 7), None);
        assert_eq!(frames.find(7), Some(1));
        assert_eq!(frames.find(8), None);
        assert_eq!(frames.first_empty(), Some(0));

        // Overwriting reports the evicted page
        assert_eq!(frames.install(1, 9), Some(7));
        assert_eq!(frames.find(7), None);
        assert_eq!(frames.get(1), Some(9));
    }

    #[test]
    fn test_page_zero_is_not_empty() {
        let mut frames = FrameSet::new(2);
        frames.install(0, 0);

        assert_eq!(frames.find(0), Some(0));
        assert_eq!(frames.first_empty(), Some(1));
        assert_eq!(frames.resident_count(), 1);
    }

    #[test]
    fn test_full_frame_set() {
        let mut frames = FrameSet::new(2);
        frames.install(0, 4);
        frames.install(1, 5);

        assert_eq!(frames.first_empty(), None);
        assert_eq!(frames.resident_count(), 2);
        assert_eq!(frames.slots(), &[Some(4), Some(5)]);
    }

    #[test]
    fn test_display() {
        let mut frames = FrameSet::new(3);
        frames.install(0, 7);
        frames.install(2, 1);
        assert_eq!(format!("{}", frames), "[7 - 1]");
    }
}
