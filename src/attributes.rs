//! GATT attribute table served by the node.
//!
//! Layout (fixed, one service):
//! ```text
//! 0  Service declaration
//! 1  PM characteristic declaration
//! 2  PM value               (read, notify)
//! 3  PM client config (CCCD)
//! 4  Info characteristic declaration
//! 5  Info value             (read)   - firmware version
//! 6  Request characteristic declaration
//! 7  Request value          (write)
//! 8  Address characteristic declaration
//! 9  Address value          (read)   - hardware address
//! ```
//!
//! Indices are assigned when the table is built and never move; the
//! stack-assigned handle for each index is recorded alongside it.

/// Number of entries in the table.
pub const ATTRIBUTE_COUNT: usize = 10;

pub const SERVICE_INDEX: usize = 0;
pub const PM_CHAR_INDEX: usize = 1;
pub const PM_VALUE_INDEX: usize = 2;
pub const PM_CCCD_INDEX: usize = 3;
pub const INFO_CHAR_INDEX: usize = 4;
pub const INFO_VALUE_INDEX: usize = 5;
pub const REQUEST_CHAR_INDEX: usize = 6;
pub const REQUEST_VALUE_INDEX: usize = 7;
pub const ADDRESS_CHAR_INDEX: usize = 8;
pub const ADDRESS_VALUE_INDEX: usize = 9;

/// What an attribute table entry is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AttributeKind {
    Service,
    CharacteristicDeclaration,
    PmValue,
    PmClientConfig,
    InfoValue,
    RequestValue,
    AddressValue,
}

/// Entry kinds in table order.
pub const LAYOUT: [AttributeKind; ATTRIBUTE_COUNT] = [
    AttributeKind::Service,
    AttributeKind::CharacteristicDeclaration,
    AttributeKind::PmValue,
    AttributeKind::PmClientConfig,
    AttributeKind::CharacteristicDeclaration,
    AttributeKind::InfoValue,
    AttributeKind::CharacteristicDeclaration,
    AttributeKind::RequestValue,
    AttributeKind::CharacteristicDeclaration,
    AttributeKind::AddressValue,
];

/// One table entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Attribute {
    pub kind: AttributeKind,
    pub handle: u16,
}

/// The node's attribute table, built once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeTable {
    entries: [Attribute; ATTRIBUTE_COUNT],
}

impl AttributeTable {
    /// Build the table from the handles the stack assigned, given in
    /// [`LAYOUT`] order.
    pub fn new(handles: [u16; ATTRIBUTE_COUNT]) -> Self {
        let mut entries = [Attribute {
            kind: AttributeKind::Service,
            handle: 0,
        }; ATTRIBUTE_COUNT];

        for (entry, (kind, handle)) in entries.iter_mut().zip(LAYOUT.iter().zip(handles)) {
            *entry = Attribute {
                kind: *kind,
                handle,
            };
        }

        Self { entries }
    }

    /// Handle of the PM value - the only attribute the core notifies on.
    pub fn pm_value_handle(&self) -> u16 {
        self.entries[PM_VALUE_INDEX].handle
    }

    /// Handle of the PM client configuration descriptor.
    pub fn pm_cccd_handle(&self) -> u16 {
        self.entries[PM_CCCD_INDEX].handle
    }

    pub fn get(&self, index: usize) -> Option<&Attribute> {
        self.entries.get(index)
    }

    /// Table index holding `handle`, if any.
    pub fn index_of(&self, handle: u16) -> Option<usize> {
        self.entries.iter().position(|a| a.handle == handle)
    }

    pub fn kind_of(&self, handle: u16) -> Option<AttributeKind> {
        self.index_of(handle).map(|i| self.entries[i].kind)
    }

    pub fn entries(&self) -> &[Attribute] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> AttributeTable {
        AttributeTable::new([40, 41, 42, 43, 44, 45, 46, 47, 48, 49])
    }

    #[test]
    fn table_follows_layout_order() {
        let t = table();
        for (entry, kind) in t.entries().iter().zip(LAYOUT.iter()) {
            assert_eq!(entry.kind, *kind);
        }
        assert_eq!(t.entries().len(), ATTRIBUTE_COUNT);
    }

    #[test]
    fn pm_value_sits_at_its_fixed_index() {
        let t = table();
        assert_eq!(PM_VALUE_INDEX, 2);
        assert_eq!(t.get(PM_VALUE_INDEX).unwrap().kind, AttributeKind::PmValue);
        assert_eq!(t.pm_value_handle(), 42);
        assert_eq!(t.pm_cccd_handle(), 43);
    }

    #[test]
    fn handle_lookup() {
        let t = table();
        assert_eq!(t.index_of(47), Some(REQUEST_VALUE_INDEX));
        assert_eq!(t.kind_of(49), Some(AttributeKind::AddressValue));
        assert_eq!(t.kind_of(45), Some(AttributeKind::InfoValue));
        assert_eq!(t.kind_of(7), None);
        assert!(t.get(ATTRIBUTE_COUNT).is_none());
    }

    #[test]
    fn declarations_precede_their_values() {
        let t = table();
        for idx in [PM_CHAR_INDEX, INFO_CHAR_INDEX, REQUEST_CHAR_INDEX, ADDRESS_CHAR_INDEX] {
            assert_eq!(
                t.get(idx).unwrap().kind,
                AttributeKind::CharacteristicDeclaration
            );
        }
        assert_eq!(t.get(SERVICE_INDEX).unwrap().kind, AttributeKind::Service);
    }
}
