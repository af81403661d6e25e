mod derive;

use proc_macro::TokenStream;

use crate::derive::handle_derive_bit;

/// Implements `padmux_bit_mask::Bitable` for a fieldless enum.
///
/// Each variant occupies the bit whose position equals its discriminant, so
/// `A = 12` maps to `1 << 12`. Variants without an explicit discriminant
/// follow the previous one, the same way Rust numbers enum variants.
#[proc_macro_derive(Bit)]
pub fn derive_bit(input: TokenStream) -> TokenStream {
    handle_derive_bit(input)
}
