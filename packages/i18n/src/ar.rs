use crate::Key;

pub const fn text(key: Key) -> &'static str {
    match key {
        Key::AppTitle => "نبيه خريطة مخاطر المنافذ",
        Key::AppSubtitle => "لوحة متابعة المخاطر",
        Key::Nationwide => "نظرة عامة على المملكة",
        Key::FilterLast24h => "آخر ٢٤ ساعة",
        Key::FilterLast7d => "آخر ٧ أيام",
        Key::FilterLast30d => "آخر ٣٠ يومًا",
        Key::TotalRiskScore => "مؤشر المخاطر",
        Key::TotalIncidents => "المخالفات المسجلة",
        Key::TotalInspectorsImpacted => "المفتشون المعنيون",
        Key::TotalPortsAffected => "المنافذ المتأثرة",
        Key::LastIncident => "آخر حادثة",
        Key::IncidentCount => "عدد المخالفات",
        Key::UniqueInspectors => "عدد المفتشين",
        Key::RiskLevel => "مستوى الخطر",
        Key::RiskLow => "منخفض",
        Key::RiskMedium => "متوسط",
        Key::RiskHigh => "مرتفع",
        Key::SeverityLow => "منخفضة",
        Key::SeverityMedium => "متوسطة",
        Key::SeverityHigh => "عالية",
        Key::Violence => "العنف",
        Key::CameraBlocking => "تغطية الكاميرا",
        Key::CameraMisuse => "سوء استخدام الكاميرا",
        Key::CameraShake => "اهتزاز غير طبيعي",
        Key::Smoking => "التدخين",
        Key::Shouting => "ارتفاع الصوت",
        Key::AbusiveLanguage => "الألفاظ المسيئة",
        Key::AllViolations => "جميع المخالفات",
        Key::AllSeverities => "جميع درجات الخطورة",
        Key::FilterByViolation => "التصفية حسب نوع المخالفة",
        Key::FilterBySeverity => "التصفية حسب الخطورة",
        Key::PortDetails => "تفاصيل المنفذ",
        Key::NoPortSelected => "اختر منفذًا من الخريطة",
        Key::TopInspectors => "أكثر المفتشين مخالفة",
        Key::InspectorDetails => "تفاصيل المفتش",
        Key::InspectorId => "رقم المفتش",
        Key::ViolationsBreakdown => "المخالفات حسب النوع",
        Key::SeverityBreakdown => "المخالفات حسب الخطورة",
        Key::PortsAffected => "المنافذ المرتبطة",
        Key::RecentIncidents => "أحدث المخالفات",
        Key::NoIncidents => "لا توجد حوادث في الفترة المحددة",
        Key::Confidence => "درجة الثقة",
        Key::Total => "الإجمالي",
        Key::ResetView => "إعادة ضبط الخريطة",
        Key::Language => "اللغة",
        Key::Back => "رجوع",
        Key::Close => "إغلاق",
        Key::Loading => "جاري التحميل...",
        Key::Error => "حدث خطأ",
        Key::NoData => "لا توجد بيانات",
        Key::ChooseAction => "ماذا تريد أن تفعل؟",
        Key::ChangeTimeRange => "تغيير الفترة الزمنية",
        Key::TimeRange => "الفترة الزمنية",
        Key::OpenPort => "عرض منفذ",
        Key::OpenInspector => "عرض مفتش",
        Key::CloseInspector => "إغلاق تفاصيل المفتش",
        Key::BackToNationwide => "العودة إلى نظرة المملكة",
        Key::PortKpis => "مؤشرات المنفذ وأحدث المخالفات",
        Key::Refresh => "تحديث",
        Key::SwitchLanguage => "تغيير اللغة",
        Key::Quit => "خروج",
    }
}
