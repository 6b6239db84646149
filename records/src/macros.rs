//! Accessor boilerplate shared by every record.
//!
//! Records keep their slots private and their mask in a field named
//! `changes`; setters are the only way to mutate a slot.

/// Getter and change-marking setter pairs for scalar slots of `Copy` types.
macro_rules! scalar_accessors {
    ($($(#[$meta:meta])* $name:ident, $setter:ident: $ty:ty;)*) => {
        $(
            $(#[$meta])*
            #[must_use]
            pub fn $name(&self) -> $ty {
                *self.$name.get()
            }

            /// Returns `true` if the value changed and the slot was marked.
            pub fn $setter(&mut self, value: $ty) -> bool {
                self.$name.set(value, &mut self.changes)
            }
        )*
    };
}

/// Indexed getter and setter pairs for fixed arrays of `Copy` types.
macro_rules! array_accessors {
    ($($(#[$meta:meta])* $name:ident, $setter:ident: $ty:ty;)*) => {
        $(
            $(#[$meta])*
            #[must_use]
            pub fn $name(&self, index: usize) -> $ty {
                *self.$name.get(index)
            }

            /// Returns `true` if the element changed and was marked.
            pub fn $setter(&mut self, index: usize, value: $ty) -> bool {
                self.$name.set(index, value, &mut self.changes)
            }
        )*
    };
}
