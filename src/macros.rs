// This is to facillitate the two different ways to call
// `impl_wire_enum`: one with doc comments and one without.
#[macro_export]
#[doc(hidden)]
macro_rules! impl_wire_enum_base {
    ($name:ident, $ty:ty, $( $var:ident => $val:expr ),* ) => {
        impl From<$ty> for $name {
            fn from(v: $ty) -> Self {
                match v {
                    $(
                        i if i == $val => $name::$var,
                    )*
                    i => $name::UnrecognizedVariant(i)
                }
            }
        }

        impl From<$name> for $ty {
            fn from(v: $name) -> Self {
                match v {
                    $(
                        $name::$var => $val,
                    )*
                    $name::UnrecognizedVariant(i) => i,
                }
            }
        }

        impl<'a> From<&'a $name> for $ty {
            fn from(v: &'a $name) -> Self {
                match *v {
                    $(
                        $name::$var => $val,
                    )*
                    $name::UnrecognizedVariant(i) => i,
                }
            }
        }

        impl $crate::ToBytes for $name {
            fn to_bytes(
                &self,
                buffer: &mut std::io::Cursor<Vec<u8>>,
            ) -> Result<(), $crate::err::SerError> {
                let v: $ty = self.into();
                $crate::ToBytes::to_bytes(&v, buffer)
            }
        }

        impl $crate::FromBytes for $name {
            fn from_bytes(
                buffer: &mut std::io::Cursor<&[u8]>,
            ) -> Result<Self, $crate::err::DeError> {
                let v = <$ty as $crate::FromBytes>::from_bytes(buffer)?;
                Ok(v.into())
            }
        }

        impl $crate::WireSize for $name {
            fn wire_size(&self) -> usize {
                std::mem::size_of::<$ty>()
            }
        }
    };
}

#[macro_export]
/// For naming a new enum, passing in what type it serializes to and
/// deserializes from, and providing a mapping from variants to the
/// constant values that ultimately cross the wire.
///
/// # Usage
/// Create an `enum` named "MyProtocolField" that serializes as a
/// big-endian `u16`:
/// ```ignore
/// impl_wire_enum!(
///     /// Field values from some table of the standard.
///     MyProtocolField, u16,
///     First => 0x0000,
///     Second => 0x0001
/// );
/// ```
macro_rules! impl_wire_enum {
    (
        $( #[$outer:meta] )*
        $name:ident, $ty:ty, $( $var:ident => $val:expr ),* $(,)?
    ) => ( // with comments
        $(#[$outer])*
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        pub enum $name {
            $(
                #[allow(missing_docs)]
                $var,
            )*
            /// Variant that signifies an invalid value while deserializing
            UnrecognizedVariant($ty),
        }

        impl_wire_enum_base!($name, $ty, $( $var => $val),* );
    );
    (
        $name:ident, $ty:ty,
        $( $var:ident => $val:expr ),* $(,)?
    ) => ( // without comments
        #[allow(missing_docs)]
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        pub enum $name {
            $(
                #[allow(missing_docs)]
                $var,
            )*
            /// Variant that signifies an invalid value while deserializing
            UnrecognizedVariant($ty),
        }

        impl_wire_enum_base!($name, $ty, $( $var => $val),* );
    );
}
