//! Complication configuration screen
//!
//! Shows which provider fills the bottom slot and lets the user pick another
//! one through the system provider chooser.

use super::{
    ComplicationType, IconId, ProviderInbox, ProviderInfo, SlotId, WatchFaceId, COMPLICATION_ID,
    COMPLICATION_IDS, SUPPORTED_TYPES, WATCH_FACE,
};

/// Request code identifying chooser results meant for this screen
pub const COMPLICATION_CONFIG_REQUEST_CODE: u16 = 1001;

/// Looks up which provider currently serves each slot.
///
/// Implementations may answer later and from any context by posting into
/// the inbox; slots without a provider are answered with `None`.
pub trait ProviderInfoRetriever {
    fn retrieve_provider_info(
        &mut self,
        watch_face: WatchFaceId,
        slot_ids: &[SlotId],
        inbox: &'static ProviderInbox,
    );
}

/// Opens the system provider chooser for one slot.
pub trait ProviderChooser {
    fn launch(
        &mut self,
        watch_face: WatchFaceId,
        slot_id: SlotId,
        supported_types: &[ComplicationType],
        request_code: u16,
    );
}

/// Result delivered by the provider chooser
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChooserResult {
    /// The user picked a provider, `None` if they cleared the slot
    Ok(Option<ProviderInfo>),
    Canceled,
}

/// Image on the slot button
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotIcon {
    AddComplication,
    Provider(IconId),
}

pub struct ConfigScreen {
    complication_id: SlotId,
    /// Slot handed to the chooser, until its result comes back
    selected_complication_id: Option<SlotId>,
    icon: SlotIcon,
    background_visible: bool,
    provider: Option<ProviderInfo>,
    inbox: &'static ProviderInbox,
}

impl ConfigScreen {
    /// Set up the screen with the add placeholder and ask for the current providers.
    pub fn new(inbox: &'static ProviderInbox, retriever: &mut impl ProviderInfoRetriever) -> Self {
        let screen = Self {
            complication_id: COMPLICATION_ID,
            selected_complication_id: None,
            icon: SlotIcon::AddComplication,
            background_visible: false,
            provider: None,
            inbox,
        };
        retriever.retrieve_provider_info(WATCH_FACE, &COMPLICATION_IDS, inbox);
        screen
    }

    /// Apply provider lookups that arrived since the last call.
    pub fn drain(&mut self) -> usize {
        let inbox = self.inbox;
        inbox.drain(|(slot_id, info)| self.update_complication_view(slot_id, info))
    }

    /// Slot button pressed
    pub fn on_click(&mut self, chooser: &mut impl ProviderChooser) {
        let slot_id = self.complication_id;
        self.selected_complication_id = Some(slot_id);
        info!("Launching provider chooser for complication {}", slot_id);
        chooser.launch(
            WATCH_FACE,
            slot_id,
            &SUPPORTED_TYPES,
            COMPLICATION_CONFIG_REQUEST_CODE,
        );
    }

    pub fn on_chooser_result(&mut self, request_code: u16, result: ChooserResult) {
        if request_code != COMPLICATION_CONFIG_REQUEST_CODE {
            return;
        }
        let ChooserResult::Ok(info) = result else {
            debug!("Provider chooser canceled");
            return;
        };
        if let Some(slot_id) = self.selected_complication_id {
            self.update_complication_view(slot_id, info);
        }
    }

    pub fn update_complication_view(&mut self, slot_id: SlotId, info: Option<ProviderInfo>) {
        if slot_id != self.complication_id {
            return;
        }
        match info {
            Some(info) => {
                self.icon = SlotIcon::Provider(info.icon);
                self.background_visible = true;
                self.provider = Some(info);
            }
            None => {
                self.icon = SlotIcon::AddComplication;
                self.background_visible = false;
                self.provider = None;
            }
        }
    }

    pub fn icon(&self) -> SlotIcon {
        self.icon
    }

    pub fn background_visible(&self) -> bool {
        self.background_visible
    }

    pub fn provider(&self) -> Option<&ProviderInfo> {
        self.provider.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::String;

    fn inbox() -> &'static ProviderInbox {
        Box::leak(Box::new(ProviderInbox::new()))
    }

    fn weather() -> ProviderInfo {
        ProviderInfo {
            app_name: String::try_from("Wetter").unwrap(),
            provider_name: String::try_from("Temperatur").unwrap(),
            icon: IconId(3),
            kind: ComplicationType::ShortText,
        }
    }

    /// Retriever that answers later from its own thread
    struct ThreadedRetriever {
        answer: Option<ProviderInfo>,
        requested: std::vec::Vec<SlotId>,
        worker: Option<std::thread::JoinHandle<()>>,
    }

    impl ProviderInfoRetriever for ThreadedRetriever {
        fn retrieve_provider_info(
            &mut self,
            watch_face: WatchFaceId,
            slot_ids: &[SlotId],
            inbox: &'static ProviderInbox,
        ) {
            assert_eq!(watch_face, WATCH_FACE);
            self.requested.extend_from_slice(slot_ids);
            let answers: std::vec::Vec<_> = slot_ids
                .iter()
                .map(|&id| (id, self.answer.clone()))
                .collect();
            self.worker = Some(std::thread::spawn(move || {
                for answer in answers {
                    inbox.post(answer).unwrap();
                }
            }));
        }
    }

    #[derive(Default)]
    struct RecordingChooser {
        launched: std::vec::Vec<(SlotId, usize, u16)>,
    }

    impl ProviderChooser for RecordingChooser {
        fn launch(
            &mut self,
            _watch_face: WatchFaceId,
            slot_id: SlotId,
            supported_types: &[ComplicationType],
            request_code: u16,
        ) {
            self.launched
                .push((slot_id, supported_types.len(), request_code));
        }
    }

    fn open(answer: Option<ProviderInfo>) -> ConfigScreen {
        let mut retriever = ThreadedRetriever {
            answer,
            requested: std::vec::Vec::new(),
            worker: None,
        };
        let screen = ConfigScreen::new(inbox(), &mut retriever);
        assert_eq!(retriever.requested, COMPLICATION_IDS);
        retriever.worker.take().unwrap().join().unwrap();
        screen
    }

    #[test]
    fn starts_with_add_placeholder() {
        let screen = open(Some(weather()));
        assert_eq!(screen.icon(), SlotIcon::AddComplication);
        assert!(!screen.background_visible());
    }

    #[test]
    fn lookup_result_shows_provider_icon() {
        let mut screen = open(Some(weather()));
        assert_eq!(screen.drain(), 1);
        assert_eq!(screen.icon(), SlotIcon::Provider(IconId(3)));
        assert!(screen.background_visible());
        assert_eq!(screen.provider(), Some(&weather()));
    }

    #[test]
    fn missing_provider_keeps_placeholder() {
        let mut screen = open(None);
        screen.drain();
        assert_eq!(screen.icon(), SlotIcon::AddComplication);
        assert!(!screen.background_visible());
    }

    #[test]
    fn other_slots_are_ignored() {
        let mut screen = open(None);
        screen.update_complication_view(5, Some(weather()));
        assert_eq!(screen.icon(), SlotIcon::AddComplication);
    }

    #[test]
    fn chooser_round_trip() {
        let mut screen = open(None);
        let mut chooser = RecordingChooser::default();
        screen.on_click(&mut chooser);
        assert_eq!(
            chooser.launched,
            [(COMPLICATION_ID, SUPPORTED_TYPES.len(), COMPLICATION_CONFIG_REQUEST_CODE)]
        );

        screen.on_chooser_result(7, ChooserResult::Ok(Some(weather())));
        assert_eq!(screen.icon(), SlotIcon::AddComplication);

        screen.on_chooser_result(COMPLICATION_CONFIG_REQUEST_CODE, ChooserResult::Canceled);
        assert_eq!(screen.icon(), SlotIcon::AddComplication);

        screen.on_chooser_result(
            COMPLICATION_CONFIG_REQUEST_CODE,
            ChooserResult::Ok(Some(weather())),
        );
        assert_eq!(screen.icon(), SlotIcon::Provider(IconId(3)));

        screen.on_chooser_result(COMPLICATION_CONFIG_REQUEST_CODE, ChooserResult::Ok(None));
        assert_eq!(screen.icon(), SlotIcon::AddComplication);
        assert!(!screen.background_visible());
    }

    #[test]
    fn result_before_click_is_dropped() {
        let mut screen = open(None);
        screen.on_chooser_result(
            COMPLICATION_CONFIG_REQUEST_CODE,
            ChooserResult::Ok(Some(weather())),
        );
        assert_eq!(screen.icon(), SlotIcon::AddComplication);
    }
}
