/// What happens to the community copy when an own food is saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareChange {
    Create,
    Sync,
    Remove,
    Keep,
}

pub fn share_change(was_shared: bool, shared: bool) -> ShareChange {
    match (was_shared, shared) {
        (false, true) => ShareChange::Create,
        (true, true) => ShareChange::Sync,
        (true, false) => ShareChange::Remove,
        (false, false) => ShareChange::Keep,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions() {
        assert_eq!(share_change(false, true), ShareChange::Create);
        assert_eq!(share_change(true, true), ShareChange::Sync);
        assert_eq!(share_change(true, false), ShareChange::Remove);
        assert_eq!(share_change(false, false), ShareChange::Keep);
    }
}
