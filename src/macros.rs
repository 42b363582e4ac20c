/// Declare a literal union as a `Copy` enum.
///
/// ```
/// json_union::literal_union! {
///     pub enum Status {
///         Pending = "pending",
///         Approved = "approved",
///     }
/// }
/// ```
///
/// Cases may mix kinds (`Auto = "auto", Hundred = 100, On = true, Half = 0.5`).
/// Integer literals outside the `i32` range need an `i64` suffix.
#[macro_export]
macro_rules! literal_union {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$case_meta:meta])* $case:ident = $lit:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$case_meta])* $case),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$case),+];
        }

        impl $crate::LiteralUnion for $name {
            fn spec() -> &'static $crate::LiteralUnionSpec {
                static SPEC: $crate::__private::Lazy<$crate::LiteralUnionSpec> =
                    $crate::__private::Lazy::new(|| {
                        $crate::LiteralUnionSpec::new(
                            stringify!($name),
                            [$($crate::LiteralValue::from($lit)),+],
                        )
                        .unwrap_or_else(|e| panic!("{e}"))
                    });
                &SPEC
            }

            fn case_index(self) -> usize {
                self as usize
            }

            fn from_case_index(index: usize) -> Option<Self> {
                Self::ALL.get(index).copied()
            }
        }

        impl $crate::__private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                $crate::__private::serde::Serialize::serialize(
                    <$name as $crate::LiteralUnion>::literal(*self),
                    serializer,
                )
            }
        }

        impl<'de> $crate::__private::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: $crate::__private::serde::Deserializer<'de>,
            {
                let wire = <$crate::__private::Value as $crate::__private::serde::Deserialize>::deserialize(deserializer)?;
                <$name as $crate::LiteralUnion>::from_wire(&wire)
                    .map_err(<D::Error as $crate::__private::serde::de::Error>::custom)
            }
        }
    };
}

/// Declare a type union as an enum with one tuple variant per shape.
///
/// Every shape must implement [`Shape`](crate::Shape). Variants are tried in
/// the order written here.
///
/// ```ignore
/// json_union::type_union! {
///     #[derive(Debug, PartialEq)]
///     pub enum UIEvent {
///         Click(ClickEvent),
///         Keyboard(KeyboardEvent),
///     }
/// }
/// ```
#[macro_export]
macro_rules! type_union {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$variant_meta:meta])* $variant:ident($shape:ty)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $($(#[$variant_meta])* $variant($shape)),+
        }

        impl $crate::UnionValue for $name {
            fn variant_index(&self) -> usize {
                #[allow(non_camel_case_types, dead_code)]
                enum Position {
                    $($variant),+
                }
                match self {
                    $($name::$variant(_) => Position::$variant as usize,)+
                }
            }
        }

        impl $crate::TypeUnion for $name {
            fn spec() -> &'static $crate::TypeUnionSpec<Self> {
                static SPEC: $crate::__private::Lazy<$crate::TypeUnionSpec<$name>> =
                    $crate::__private::Lazy::new(|| {
                        let builder = $crate::TypeUnionSpec::<$name>::builder(stringify!($name));
                        $(
                            let builder = builder
                                .shape::<$shape>(stringify!($variant), $name::$variant, |value| match value {
                                    $name::$variant(shape) => Some(shape),
                                    #[allow(unreachable_patterns)]
                                    _ => None,
                                })
                                .unwrap_or_else(|e| panic!("{e}"));
                        )+
                        builder.build().unwrap_or_else(|e| panic!("{e}"))
                    });
                &SPEC
            }
        }

        impl $crate::__private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                let value = <$name as $crate::TypeUnion>::spec()
                    .encode(self)
                    .map_err(<S::Error as $crate::__private::serde::ser::Error>::custom)?;
                $crate::__private::serde::Serialize::serialize(&value, serializer)
            }
        }

        impl<'de> $crate::__private::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: $crate::__private::serde::Deserializer<'de>,
            {
                let value = <$crate::__private::Value as $crate::__private::serde::Deserialize>::deserialize(deserializer)?;
                <$name as $crate::TypeUnion>::spec()
                    .decode_value(&value)
                    .map_err(<D::Error as $crate::__private::serde::de::Error>::custom)
            }
        }
    };
}
