//! Descriptions and expected outputs of the three newsletter tasks

use agent_prompt::{JinjaTemplate, Result};

pub const GET_STOCK_PRICE: &str = "get_stock_price";
pub const GET_NEWS: &str = "get_news";
pub const WRITE_ANALYSIS: &str = "write_analysis";

pub const GET_STOCK_PRICE_DESCRIPTION: &str = "newsletter.get_stock_price.description";
pub const GET_STOCK_PRICE_EXPECTED: &str = "newsletter.get_stock_price.expected_output";
pub const GET_NEWS_DESCRIPTION: &str = "newsletter.get_news.description";
pub const GET_NEWS_EXPECTED: &str = "newsletter.get_news.expected_output";
pub const WRITE_ANALYSIS_DESCRIPTION: &str = "newsletter.write_analysis.description";
pub const WRITE_ANALYSIS_EXPECTED: &str = "newsletter.write_analysis.expected_output";

pub fn get_stock_price_description() -> Result<JinjaTemplate> {
    JinjaTemplate::new(
        GET_STOCK_PRICE_DESCRIPTION,
        "Analyze the stock {{ ticker }} price history and create a trend analysis of up, down or sideways",
    )
}

pub fn get_stock_price_expected() -> Result<JinjaTemplate> {
    JinjaTemplate::new(
        GET_STOCK_PRICE_EXPECTED,
        "Specify the current trend stock price - up, down or sideways.
eg. stock = 'APPL, price'",
    )
}

pub fn get_news_description() -> Result<JinjaTemplate> {
    JinjaTemplate::new(
        GET_NEWS_DESCRIPTION,
        "Take the stock and always include BTC to it (if not requested).
Use the search tool to search each one individually.

The current date is {{ current_date }}.

Compose the results into a helpfull report",
    )
}

pub fn get_news_expected() -> Result<JinjaTemplate> {
    JinjaTemplate::new(
        GET_NEWS_EXPECTED,
        "A summary of the overall market and one sentence summary for each requested asset.
Include a fear/greed score for each asset based on the news. Use format:
<STOCK ASSET>
<SUMMARY BASED ON NEWS>
<TREND PREDICTION>
<FEAR/GREED SCORE>",
    )
}

pub fn write_analysis_description() -> Result<JinjaTemplate> {
    JinjaTemplate::new(
        WRITE_ANALYSIS_DESCRIPTION,
        "Use the stock price trend and the stock news report to create an analysis and write the newsletter about the {{ ticker }} company
that is brief and highlights the most important points.
Focus on the stock price trend, news and fear/greed score. What are the near future considerations?
Include the previous analysis of stock trend and news summary.",
    )
}

pub fn write_analysis_expected() -> Result<JinjaTemplate> {
    JinjaTemplate::new(
        WRITE_ANALYSIS_EXPECTED,
        "An eloquent 3 paragraphs newsletter formatted as markdown in an easy readable manner. It should contain:

- 3 bullets executive summary
- Introduction - set the overall picture and spike up the interest
- main part provides the meat of the analysis including the news summary and fear/greed score
- summary - key facts and concrete future trend prediction - up, down or sideways.",
    )
}
