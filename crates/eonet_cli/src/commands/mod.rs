pub(crate) mod categories;
pub(crate) mod load;
pub(crate) mod meta;
pub(crate) mod output;
