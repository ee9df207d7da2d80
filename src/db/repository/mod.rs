pub mod availability;
pub mod blackout;
pub mod booking;
pub mod meeting_type;
pub mod schedule_settings;

pub use availability::AvailabilityRepository;
pub use blackout::BlackoutRepository;
pub use booking::BookingRepository;
pub use meeting_type::MeetingTypeRepository;
pub use schedule_settings::ScheduleSettingsRepository;
