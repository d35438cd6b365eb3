//! Branch target buffer tests.

use pipesim_core::core::units::bru::btb::Btb;
use pretty_assertions::assert_eq;

#[test]
fn empty_btb_misses() {
    let btb = Btb::new(16);
    assert_eq!(btb.capacity(), 16);
    assert_eq!(btb.lookup(0x40_0000), None);
}

#[test]
fn update_then_hit() {
    let mut btb = Btb::new(16);
    btb.update(0x40_0010, 0x40_0000);
    assert_eq!(btb.lookup(0x40_0010), Some(0x40_0000));

    btb.update(0x40_0010, 0x40_0400);
    assert_eq!(btb.lookup(0x40_0010), Some(0x40_0400));
}

#[test]
fn aliasing_branches_evict_each_other() {
    // With four entries, PCs 0x00 and 0x10 share an index.
    let mut btb = Btb::new(4);
    btb.update(0x00, 0x100);
    btb.update(0x10, 0x200);
    assert_eq!(btb.lookup(0x10), Some(0x200));
    assert_eq!(btb.lookup(0x00), None, "full-PC tag rejects the alias");
}
