/*!
# Sales Dashboard

A browser-based dashboard that walks through the sellers of a sales branch,
one seller at a time, built in Rust.

## Overview

The dashboard reads a sales spreadsheet (one row per seller and product
category), lets the viewer pick a branch and then shows the selected
seller's categories as a formatted table together with a bar chart of
target achievement. The seller changes on a button press or automatically
after a configurable interval, wrapping around at the end of the branch.

## Architecture

### Data Layer
- **loader**: Reads `.xlsx`/`.xlsm`/`.xls`/`.ods` workbooks and `.csv` files into a [`Dataset`]
- **cache**: Reads the file once and shares the dataset between requests
- **dataset**: Branch and seller queries over the loaded rows

### Render Pass
- **selector**: Branch resolution and the wrapping seller cursor
- **format**: Display strings for the table (`45.67 %`, `1,234,567`) and chart points
- **view**: One pass from dataset and selection to a ready table, a warning or an error

### Web Layer
- **session**: Per-browser branch and cursor, with the auto-advance deadline
- **graph**: SVG bar chart of target achievement per category
- **downloader**: CSV and XLSX export of the shown table
- **app**: Routing, middleware and the auto-advance timer

## Expected Columns

| Column        | Use                                   |
|---------------|---------------------------------------|
| `Branch`      | Branch filter (required)              |
| `Name`        | Seller name (required)                |
| `Ctg`         | Product category                      |
| `Sale`        | Sales amount, thousands separated     |
| `Tgt`         | Target amount, thousands separated    |
| `%Achivement` | Ratio, shown as a percentage          |
| `commesion`   | Commission, thousands separated       |

## HTTP Endpoints

- `/` - Dashboard page for the caller's session
- `/branch` - Select a branch (form post)
- `/next` - Move to the next seller (form post)
- `/chart.svg` - Achievement chart of the current seller
- `/export.csv`, `/export.xlsx` - Download the current table
- `/api/view` - Current render state as JSON
- `/api/reload` - Drop the cached dataset and read the file again
*/

pub mod cache;
pub mod config;
pub mod dataset;
pub mod downloader;
pub mod error;
pub mod format;
pub mod loader;
pub mod record;
pub mod selector;
pub mod view;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod graph;
#[cfg(feature = "web")]
pub mod session;

pub use cache::DatasetCache;
pub use config::DashboardConfig;
pub use dataset::{Dataset, SellerRows};
pub use error::{DashboardError, Result};
pub use format::{ChartPoint, SellerTable, TableRow};
pub use record::{SalesRecord, Value};
pub use selector::SellerCursor;
pub use view::{DashboardView, ViewState};
