use camjigsaw_core::{Difficulty, Leaderboard};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, HtmlButtonElement, HtmlElement, HtmlInputElement, HtmlSelectElement,
};

const TIER_HEADER_STYLE: &str = "background:rgb(123,146,196);color:white";

fn by_id<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{id}")))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("#{id} has the wrong element type")))
}

fn set_visible(element: &HtmlElement, visible: bool) {
    let display = if visible { "block" } else { "none" };
    let _ = element.style().set_property("display", display);
}

/// DOM screens around the board: start menu, clock, end screen and scores.
pub(crate) struct Menu {
    document: Document,
    menu_items: HtmlElement,
    difficulty: HtmlSelectElement,
    pub(crate) start_button: HtmlButtonElement,
    time: HtmlElement,
    end_screen: HtmlElement,
    score_value: HtmlElement,
    name: HtmlInputElement,
    pub(crate) save_button: HtmlButtonElement,
    pub(crate) scores_button: HtmlButtonElement,
    pub(crate) menu_button: HtmlButtonElement,
    scores_screen: HtmlElement,
    scores_container: HtmlElement,
    pub(crate) close_scores_button: HtmlButtonElement,
}

impl Menu {
    pub(crate) fn from_document(document: &Document) -> Result<Self, JsValue> {
        Ok(Self {
            document: document.clone(),
            menu_items: by_id(document, "menuItems")?,
            difficulty: by_id(document, "difficulty")?,
            start_button: by_id(document, "startBtn")?,
            time: by_id(document, "time")?,
            end_screen: by_id(document, "endScreen")?,
            score_value: by_id(document, "scoreValue")?,
            name: by_id(document, "name")?,
            save_button: by_id(document, "saveBtn")?,
            scores_button: by_id(document, "scoresBtn")?,
            menu_button: by_id(document, "menuBtn")?,
            scores_screen: by_id(document, "scoresScreen")?,
            scores_container: by_id(document, "scoresContainer")?,
            close_scores_button: by_id(document, "closeScoresBtn")?,
        })
    }

    pub(crate) fn selected_difficulty(&self) -> Difficulty {
        let raw = self.difficulty.value();
        raw.parse().unwrap_or_else(|_| {
            gloo::console::warn!("unknown difficulty option", raw.as_str());
            Difficulty::default()
        })
    }

    pub(crate) fn select_difficulty(&self, difficulty: Difficulty) {
        self.difficulty.set_value(difficulty.name());
    }

    pub(crate) fn player_name(&self) -> String {
        self.name.value()
    }

    pub(crate) fn set_time(&self, text: &str) {
        self.time.set_text_content(Some(text));
    }

    pub(crate) fn hide_menu(&self) {
        set_visible(&self.menu_items, false);
    }

    pub(crate) fn show_menu(&self) {
        set_visible(&self.end_screen, false);
        set_visible(&self.menu_items, true);
    }

    pub(crate) fn show_end_screen(&self, elapsed_ms: f64) {
        let seconds = (elapsed_ms.max(0.0) / 1000.0).floor() as u64;
        self.score_value
            .set_text_content(Some(&format!("Score: {seconds}")));
        self.save_button.set_text_content(Some("Save"));
        self.save_button.set_disabled(false);
        set_visible(&self.end_screen, true);
    }

    pub(crate) fn mark_saving(&self) {
        self.save_button.set_disabled(true);
    }

    pub(crate) fn mark_saved(&self) {
        self.save_button.set_text_content(Some("OK!"));
    }

    pub(crate) fn show_scores_loading(&self) {
        set_visible(&self.end_screen, false);
        set_visible(&self.scores_screen, true);
        self.scores_container.set_text_content(Some("Loading..."));
    }

    pub(crate) fn show_scores_error(&self, message: &str) {
        self.scores_container.set_text_content(Some(message));
    }

    pub(crate) fn close_scores(&self) {
        set_visible(&self.end_screen, true);
        set_visible(&self.scores_screen, false);
    }

    /// One table, a header row per tier followed by its ranked entries.
    pub(crate) fn render_leaderboard(&self, board: &Leaderboard) -> Result<(), JsValue> {
        let table = self.document.create_element("table")?;
        table.set_attribute("style", "width:100%;text-align:center;")?;
        for difficulty in Difficulty::ALL {
            let header = self.row(&["", difficulty.label(), "Time"])?;
            header.set_attribute("style", TIER_HEADER_STYLE)?;
            table.append_child(&header)?;
            for (rank, entry) in board.tier(difficulty).iter().enumerate() {
                let rank = format!("{}.", rank + 1);
                let seconds = entry.seconds().to_string();
                let row = self.row(&[rank.as_str(), entry.name.as_str(), seconds.as_str()])?;
                table.append_child(&row)?;
            }
        }
        self.scores_container.set_text_content(None);
        self.scores_container.append_child(&table)?;
        Ok(())
    }

    fn row(&self, cells: &[&str]) -> Result<Element, JsValue> {
        let row = self.document.create_element("tr")?;
        for text in cells {
            let cell = self.document.create_element("td")?;
            cell.set_text_content(Some(text));
            row.append_child(&cell)?;
        }
        Ok(row)
    }
}
