pub mod book;
pub mod parsha;
pub mod stats;

pub use book::Book;
pub use parsha::{Aliyah, Parsha};
pub use stats::{
    AggregateStats, BookGroups, ParshaStats, Percentages, Tally, book_stats, global_stats,
    group_by_book, parsha_stats,
};
