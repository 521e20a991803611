//! Page-index augmentation for loops
//!
//!     `[apply p=page(index, size, '4')]` inside a `[loop]` yields the position of the current
//!     row within fixed-size pages, so templates can open and close page containers.

use super::{expect_arity, Argument, Function, FunctionError};
use crate::data::{Data, Value};

/// Position of one row among pages of `page_size` rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageIndex {
    pub is_first_on_page: bool,
    pub is_last_on_page: bool,
    /// One-based row within the page
    pub page_row: usize,
    /// One-based page number
    pub page_number: usize,
    pub page_count: usize,
}

impl PageIndex {
    /// `page_size` of zero is treated as one page holding every row
    pub fn new(index: usize, size: usize, page_size: usize) -> Self {
        let page_size = if page_size == 0 { size.max(1) } else { page_size };
        let offset = index % page_size;
        Self {
            is_first_on_page: offset == 0,
            is_last_on_page: offset + 1 == page_size || index + 1 == size,
            page_row: offset + 1,
            page_number: index / page_size + 1,
            page_count: size.div_ceil(page_size),
        }
    }

    pub fn to_value(self) -> Value {
        Value::map([
            ("isFirstOnPage", Value::Bool(self.is_first_on_page)),
            ("isLastOnPage", Value::Bool(self.is_last_on_page)),
            ("pageRow", Value::from(self.page_row)),
            ("pageNumber", Value::from(self.page_number)),
            ("pageCount", Value::from(self.page_count)),
        ])
    }
}

/// The `page(index, size[, pageSize])` function
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub default_page_size: usize,
}

fn non_negative(args: &[Argument], index: usize) -> Result<usize, FunctionError> {
    args[index]
        .value()
        .as_i64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| FunctionError::bad_argument(index, "expected a non-negative integer"))
}

impl Function for Page {
    fn call(&self, _data: &Data, args: &[Argument]) -> Result<Value, FunctionError> {
        expect_arity(args, 2, 3)?;
        let index = non_negative(args, 0)?;
        let size = non_negative(args, 1)?;
        let page_size = if args.len() == 3 && !args[2].is_null() {
            non_negative(args, 2)?
        } else {
            self.default_page_size
        };
        Ok(PageIndex::new(index, size, page_size).to_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_row_of_first_page() {
        let page = PageIndex::new(0, 8, 4);
        assert!(page.is_first_on_page);
        assert!(!page.is_last_on_page);
        assert_eq!((page.page_row, page.page_number, page.page_count), (1, 1, 2));
    }

    #[test]
    fn test_last_row_of_last_page() {
        let page = PageIndex::new(7, 8, 4);
        assert!(page.is_last_on_page);
        assert_eq!((page.page_row, page.page_number, page.page_count), (4, 2, 2));
    }

    #[test]
    fn test_short_last_page() {
        let page = PageIndex::new(8, 9, 4);
        assert!(page.is_first_on_page && page.is_last_on_page);
        assert_eq!(page.page_count, 3);
    }

    #[test]
    fn test_function_uses_default_page_size() {
        let f = Page {
            default_page_size: 4,
        };
        let args = [
            Argument::Literal("4".into()),
            Argument::Literal("8".into()),
        ];
        let value = f.call(&Data::empty(), &args).expect("page");
        let data = Data::from_value(value);
        assert_eq!(data.get("pageNumber").into_value(), Value::Int(2));
        assert_eq!(data.get("isFirstOnPage").into_value(), Value::Bool(true));
    }

    #[test]
    fn test_rejects_negative_index() {
        let f = Page {
            default_page_size: 4,
        };
        let args = [Argument::Literal("-1".into()), Argument::Literal("8".into())];
        assert!(matches!(
            f.call(&Data::empty(), &args),
            Err(FunctionError::BadArgument { index: 0, .. })
        ));
    }
}
