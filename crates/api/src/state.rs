use std::sync::Arc;

use dwellhub_config::Settings;
use dwellhub_services::{
    AuthService, GoogleClient, PredictionClient, ReferenceIndex,
    dao::{
        booking::BookingDao, conversation::ConversationDao, lease::LeaseDao,
        maintenance::MaintenanceDao, notification::NotificationDao, property::PropertyDao,
        review::ReviewDao, transaction::TransactionDao, user::UserDao,
    },
};
use mongodb::Database;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub auth: Arc<AuthService>,
    pub refs: Arc<ReferenceIndex>,
    pub google: Arc<GoogleClient>,
    pub prediction: Arc<PredictionClient>,
    pub users: Arc<UserDao>,
    pub properties: Arc<PropertyDao>,
    pub bookings: Arc<BookingDao>,
    pub leases: Arc<LeaseDao>,
    pub maintenance: Arc<MaintenanceDao>,
    pub notifications: Arc<NotificationDao>,
    pub reviews: Arc<ReviewDao>,
    pub transactions: Arc<TransactionDao>,
    pub conversations: Arc<ConversationDao>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> Self {
        let refs = Arc::new(ReferenceIndex::new(&db));

        Self {
            auth: Arc::new(AuthService::new(settings.jwt.clone())),
            google: Arc::new(GoogleClient::new(&settings.google)),
            prediction: Arc::new(PredictionClient::new(&settings.prediction)),
            users: Arc::new(UserDao::new(&db)),
            properties: Arc::new(PropertyDao::new(&db, refs.clone())),
            bookings: Arc::new(BookingDao::new(&db, refs.clone())),
            leases: Arc::new(LeaseDao::new(&db, refs.clone())),
            maintenance: Arc::new(MaintenanceDao::new(&db, refs.clone())),
            notifications: Arc::new(NotificationDao::new(&db, refs.clone())),
            reviews: Arc::new(ReviewDao::new(&db, refs.clone())),
            transactions: Arc::new(TransactionDao::new(&db, refs.clone())),
            conversations: Arc::new(ConversationDao::new(&db)),
            refs,
            settings,
        }
    }
}
