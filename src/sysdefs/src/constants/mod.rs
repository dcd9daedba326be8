// Guest ABI constants.
//
// The `reversible_enum!` macro lives here (ahead of the submodules) so the
// result-code and mode enums can be converted back from the raw numbers the
// guest hands us.

#[doc(hidden)]
macro_rules! reversible_enum {
    ($(#[$settings: meta])* $visibility: vis enum $enumname:ident {
        $($valuename: ident = $value: literal,)*
    }) => {
        $(#[$settings])*
        $visibility enum $enumname {
            $($valuename = $value,)*
        }

        impl $enumname {
            #[doc(hidden)]
            #[allow(clippy::result_unit_err)]
            $visibility fn from_discriminant(v: u32) -> Result<Self, ()> {
                match v {
                    $($value => Ok($enumname::$valuename),)*
                    _ => Err(()),
                }
            }
        }
    }
}

pub mod err_const;
pub mod io_const;
pub mod utility_const;

pub use err_const::*;
pub use io_const::*;
pub use utility_const::*;
