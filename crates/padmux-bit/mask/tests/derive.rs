use padmux_bit_derive::Bit;
use padmux_bit_mask::{Bitable, Bitmask};

#[derive(Bit, Debug, Clone, Copy, PartialEq, Eq)]
enum Sequential {
    First,
    Second,
    Third,
}

#[derive(Bit, Debug, Clone, Copy, PartialEq, Eq)]
enum Sparse {
    Low = 0,
    Next,
    High = 12,
    Top,
}

#[test]
fn sequential_variants_take_consecutive_bits() {
    assert_eq!(Sequential::First.bit(), 1);
    assert_eq!(Sequential::Second.bit(), 2);
    assert_eq!(Sequential::Third.bit(), 4);
    assert_eq!(Sequential::Third.index(), 2);
}

#[test]
fn explicit_discriminants_are_bit_positions() {
    assert_eq!(Sparse::Low.bit(), 0x0001);
    assert_eq!(Sparse::Next.bit(), 0x0002);
    assert_eq!(Sparse::High.bit(), 0x1000);
    assert_eq!(Sparse::Top.bit(), 0x2000);
}

#[test]
fn from_index_inverts_index() {
    assert_eq!(Sparse::from_index(12), Some(Sparse::High));
    assert_eq!(Sparse::from_index(13), Some(Sparse::Top));
    assert_eq!(Sparse::from_index(2), None);
}

#[test]
fn derived_values_iterate_from_raw_mask() {
    let mask = Bitmask::<Sparse>::from_value(0x3001);
    let values: Vec<_> = mask.iter().collect();
    assert_eq!(values, vec![Sparse::Low, Sparse::High, Sparse::Top]);
}
