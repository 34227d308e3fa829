/// Allocator of temporary ids for one decompilation scope.
///
/// Ids are handed out in increasing order and never reused.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeContext {
    next_temporary: u32,
}

impl ScopeContext {
    /// Creates an empty scope, allocating from id 0.
    #[must_use]
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Creates a scope whose first allocated id is `next_temporary`.
    #[must_use]
    pub const fn starting_at(next_temporary: u32) -> Self {
        ScopeContext { next_temporary }
    }

    /// Allocates a fresh temporary id.
    pub fn alloc_temporary(&mut self) -> u32 {
        let id = self.next_temporary;
        self.next_temporary += 1;
        id
    }

    /// Returns the id the next allocation will return.
    #[must_use]
    pub const fn next_temporary(&self) -> u32 {
        self.next_temporary
    }
}
